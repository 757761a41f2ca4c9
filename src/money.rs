// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Decimal amount tagged with a currency code.
//!
//! Arithmetic between two different currencies is an error, never a
//! silent conversion.

use crate::error::{LedgerError, LedgerResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_uppercase(),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    fn same_currency(&self, other: &Money) -> LedgerResult<()> {
        if self.currency != other.currency {
            return Err(LedgerError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Money) -> LedgerResult<Money> {
        self.same_currency(other)?;
        Ok(Money {
            amount: add_amounts(self.amount, other.amount)?,
            currency: self.currency.clone(),
        })
    }

    pub fn checked_sub(&self, other: &Money) -> LedgerResult<Money> {
        self.same_currency(other)?;
        Ok(Money {
            amount: sub_amounts(self.amount, other.amount)?,
            currency: self.currency.clone(),
        })
    }

    pub fn try_cmp(&self, other: &Money) -> LedgerResult<Ordering> {
        self.same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Sums `items` in `currency`; an item in any other currency fails.
    pub fn sum<'a, I>(currency: &str, items: I) -> LedgerResult<Money>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        items
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

fn overflow() -> LedgerError {
    LedgerError::InvalidArgument("amount overflow".into())
}

/// `a + b`, or an error when the result does not fit in a `Decimal`.
pub fn add_amounts(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_add(b).ok_or_else(overflow)
}

/// `a - b`, or an error when the result does not fit in a `Decimal`.
pub fn sub_amounts(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_sub(b).ok_or_else(overflow)
}

/// Upper-cases and validates an ISO 4217 style code (three ASCII letters).
pub fn normalize_currency(code: &str) -> LedgerResult<String> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(LedgerError::InvalidArgument(format!(
            "invalid currency code '{}'",
            code
        )));
    }
    Ok(code)
}
