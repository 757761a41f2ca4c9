// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::decimal_at;
use crate::ledger;
use crate::money::sub_amounts;
use crate::utils::{maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => {
            let data = balance_rows(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.account.clone(),
                            r.r#type.clone(),
                            r.currency.clone(),
                            format!("{:.2}", r.balance),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Account", "Type", "CCY", "Balance"], rows)
                );
            }
        }
        Some(("spending", sub)) => {
            let month = parse_month(sub.get_one::<String>("month").unwrap())?;
            let data = spending_by_category(conn, &month)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.category.clone(),
                            r.currency.clone(),
                            format!("{:.2}", r.spent),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Category", "CCY", "Spent"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub account: String,
    pub r#type: String,
    pub currency: String,
    pub balance: Decimal,
}

/// Served from the cached balances.
pub fn balance_rows(conn: &Connection) -> Result<Vec<BalanceRow>> {
    Ok(ledger::list_accounts(conn)?
        .into_iter()
        .map(|a| BalanceRow {
            account: a.name,
            r#type: a.r#type.to_string(),
            currency: a.currency,
            balance: a.balance_value,
        })
        .collect())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SpendingRow {
    pub category: String,
    pub currency: String,
    /// Positive magnitude of the outflows.
    pub spent: Decimal,
}

/// Outflows (negative entries) incurred during `month` (YYYY-MM), grouped
/// by the owning transaction's category and currency. Uncategorised
/// spending is reported under an empty category name. Transactions whose
/// entries net to zero only move money between accounts and are skipped.
pub fn spending_by_category(conn: &Connection, month: &str) -> Result<Vec<SpendingRow>> {
    let mut stmt = conn.prepare(
        "SELECT e.transaction_id, COALESCE(c.name, ''), t.currency, e.amount
         FROM entry e
         JOIN money_transaction t ON e.transaction_id=t.id
         LEFT JOIN category c ON t.category_id=c.id
         WHERE substr(e.incurred_at,1,7)=?1",
    )?;
    let mut rows = stmt.query(params![month])?;
    let mut internal: HashMap<i64, bool> = HashMap::new();
    let mut totals: BTreeMap<(String, String), Decimal> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let amount = decimal_at(r, 3)?;
        if !amount.is_sign_negative() || amount.is_zero() {
            continue;
        }
        let txn_id: i64 = r.get(0)?;
        let is_internal = match internal.get(&txn_id) {
            Some(v) => *v,
            None => {
                let v = ledger::transaction_total(conn, txn_id)?.is_zero();
                internal.insert(txn_id, v);
                v
            }
        };
        if is_internal {
            continue;
        }
        let key = (r.get::<_, String>(1)?, r.get::<_, String>(2)?);
        let spent = totals.entry(key).or_default();
        *spent = sub_amounts(*spent, amount)?;
    }
    Ok(totals
        .into_iter()
        .map(|((category, currency), spent)| SpendingRow {
            category,
            currency,
            spent,
        })
        .collect())
}
