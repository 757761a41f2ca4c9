// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Full recompute of cached balances, for spotting and repairing drift.

use super::accounts::list_accounts;
use crate::db::decimal_at;
use crate::error::LedgerResult;
use crate::money::add_amounts;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    pub account_id: i64,
    pub name: String,
    pub cached: Decimal,
    pub computed: Decimal,
}

fn entry_sums(conn: &Connection) -> LedgerResult<HashMap<i64, Decimal>> {
    let mut stmt = conn.prepare("SELECT account_id, amount FROM entry")?;
    let mut rows = stmt.query([])?;
    let mut sums: HashMap<i64, Decimal> = HashMap::new();
    while let Some(r) = rows.next()? {
        let account_id: i64 = r.get(0)?;
        let sum = sums.entry(account_id).or_default();
        *sum = add_amounts(*sum, decimal_at(r, 1)?)?;
    }
    Ok(sums)
}

/// Accounts whose cached balance differs from `initial + sum(entries)`.
pub fn verify_balances(conn: &Connection) -> LedgerResult<Vec<BalanceDrift>> {
    let sums = entry_sums(conn)?;
    let mut drift = Vec::new();
    for account in list_accounts(conn)? {
        let computed = add_amounts(
            account.initial_value,
            sums.get(&account.id).copied().unwrap_or_default(),
        )?;
        if computed != account.balance_value {
            tracing::warn!(
                account = account.id,
                cached = %account.balance_value,
                %computed,
                "cached balance drifted"
            );
            drift.push(BalanceDrift {
                account_id: account.id,
                name: account.name,
                cached: account.balance_value,
                computed,
            });
        }
    }
    Ok(drift)
}

/// Overwrites every drifted cache with the recomputed value and returns
/// what was fixed.
pub fn recompute_balances(conn: &mut Connection) -> LedgerResult<Vec<BalanceDrift>> {
    let tx = conn.transaction()?;
    let drift = verify_balances(&tx)?;
    for d in &drift {
        tx.execute(
            "UPDATE account SET balance_value=?1 WHERE id=?2",
            params![d.computed.to_string(), d.account_id],
        )?;
    }
    tx.commit()?;
    if !drift.is_empty() {
        tracing::info!(accounts = drift.len(), "balances recomputed");
    }
    Ok(drift)
}
