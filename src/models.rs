// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::money::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Cash,
    Envelope,
    Asset,
    Receivable,
    Payable,
    Expense,
    Income,
}

impl AccountType {
    pub const ALL: [AccountType; 7] = [
        AccountType::Cash,
        AccountType::Envelope,
        AccountType::Asset,
        AccountType::Receivable,
        AccountType::Payable,
        AccountType::Expense,
        AccountType::Income,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "cash",
            AccountType::Envelope => "envelope",
            AccountType::Asset => "asset",
            AccountType::Receivable => "receivable",
            AccountType::Payable => "payable",
            AccountType::Expense => "expense",
            AccountType::Income => "income",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AccountType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| LedgerError::InvalidArgument(format!("unknown account type '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub r#type: AccountType,
    pub currency: String,
    /// Opening balance as entered by the user.
    pub initial_value: Decimal,
    /// Cached `initial_value + sum(entries)`.
    pub balance_value: Decimal,
}

impl Account {
    pub fn balance(&self) -> Money {
        Money::new(self.balance_value, &self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyTransaction {
    pub id: i64,
    /// Human-facing reference; creation instant in ms, unique and increasing.
    pub number: i64,
    pub description: String,
    pub category_id: Option<i64>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount: Decimal,
    pub incurred_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
    pub reference: Option<String>,
}

/// Fields for an entry that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount: Decimal,
    pub incurred_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
    pub reference: Option<String>,
}

impl NewEntry {
    pub fn new(transaction_id: i64, account_id: i64, amount: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            transaction_id,
            account_id,
            amount,
            incurred_at: at,
            recorded_at: at,
            reference: None,
        }
    }
}
