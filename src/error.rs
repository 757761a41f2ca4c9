// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error type shared by the ledger layer.

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A referenced row does not exist.
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: String },

    /// Arithmetic or comparison across two different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller's copy of an entry no longer matches what is stored.
    #[error("entry {0} was modified since it was read")]
    StaleEntry(i64),

    #[error("transaction {0} still has entries; delete them first or cascade")]
    TransactionHasEntries(i64),

    #[error("account '{0}' still has entries")]
    AccountHasEntries(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
