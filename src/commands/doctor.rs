// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::store::LedgerStore;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Problems the cached state can have, as (issue, detail) rows.
pub fn diagnose(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Cached balances that no longer match their entries
    for d in ledger::verify_balances(conn)? {
        rows.push(vec![
            "balance_drift".into(),
            format!("{}: cached {} vs computed {}", d.name, d.cached, d.computed),
        ]);
    }

    // 2) Entries whose account currency differs from their transaction's
    let mut stmt = conn.prepare(
        "SELECT e.id, a.currency, t.currency FROM entry e
         JOIN account a ON e.account_id=a.id
         JOIN money_transaction t ON e.transaction_id=t.id
         WHERE a.currency != t.currency",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let acct: String = r.get(1)?;
        let txn: String = r.get(2)?;
        rows.push(vec!["currency_mismatch".into(), format!("entry {} {} vs {}", id, acct, txn)]);
    }

    // 3) Transactions left without entries
    let mut stmt = conn.prepare(
        "SELECT number FROM money_transaction t
         WHERE NOT EXISTS (SELECT 1 FROM entry e WHERE e.transaction_id=t.id)
         ORDER BY number",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let number: i64 = r.get(0)?;
        rows.push(vec!["empty_transaction".into(), format!("#{}", number)]);
    }
    Ok(rows)
}

pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    let rows = diagnose(store.conn())?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    if m.get_flag("fix") {
        let fixed = store.recompute_balances()?;
        println!("Recomputed {} account balance(s)", fixed.len());
    }
    Ok(())
}
