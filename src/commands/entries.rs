// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::{incurred_at, transaction_arg};
use crate::ledger;
use crate::models::{Entry, NewEntry};
use crate::store::LedgerStore;
use crate::utils::{maybe_print_json, parse_decimal, parse_instant, pretty_table};
use anyhow::{Context, Result, bail};
use chrono::Utc;

pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => {
            let entry = entry_arg(store, sub)?;
            store.delete_entry(&entry)?;
            println!("Removed entry {} ({:.2})", entry.id, entry.amount);
        }
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn entry_arg(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<Entry> {
    let id = sub.get_one::<i64>("id").copied().context("--id is required")?;
    Ok(ledger::get_entry(store.conn(), id)?)
}

fn add(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let now = Utc::now();
    let txn = transaction_arg(store.conn(), sub)?;
    let account = ledger::account_by_name(store.conn(), sub.get_one::<String>("account").unwrap())?;
    let new = NewEntry {
        transaction_id: txn.id,
        account_id: account.id,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        incurred_at: incurred_at(sub, now)?,
        recorded_at: now,
        reference: sub.get_one::<String>("reference").cloned(),
    };
    let entry = store.create_entry(&new)?;
    println!(
        "Added entry {} to #{} on '{}'",
        entry.id, txn.number, account.name
    );
    Ok(())
}

fn edit(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let original = entry_arg(store, sub)?;
    let mut modified = original.clone();
    let mut changed = false;
    if let Some(raw) = sub.get_one::<String>("amount") {
        modified.amount = parse_decimal(raw)?;
        changed = true;
    }
    if let Some(name) = sub.get_one::<String>("account") {
        modified.account_id = ledger::account_by_name(store.conn(), name)?.id;
        changed = true;
    }
    if let Some(raw) = sub.get_one::<String>("date") {
        modified.incurred_at = parse_instant(raw)?;
        changed = true;
    }
    if let Some(reference) = sub.get_one::<String>("reference") {
        modified.reference = Some(reference.clone()).filter(|r| !r.is_empty());
        changed = true;
    }
    if !changed {
        bail!("Nothing to change; pass --amount, --account, --date or --reference");
    }
    modified.recorded_at = Utc::now();
    let entry = store.edit_entry(&original, &modified)?;
    println!("Updated entry {} ({:.2})", entry.id, entry.amount);
    Ok(())
}

fn list(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let conn = store.conn();
    let entries = if let Some(name) = sub.get_one::<String>("account") {
        ledger::entries_for_account(conn, ledger::account_by_name(conn, name)?.id)?
    } else if sub.get_one::<i64>("number").is_some() {
        ledger::entries_for_transaction(conn, transaction_arg(conn, sub)?.id)?
    } else {
        bail!("Pass --account or --number");
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
        let rows = entries
            .iter()
            .map(|e| -> Result<Vec<String>> {
                Ok(vec![
                    e.id.to_string(),
                    ledger::get_transaction(conn, e.transaction_id)?.number.to_string(),
                    ledger::get_account(conn, e.account_id)?.name,
                    format!("{:.2}", e.amount),
                    e.incurred_at.format("%Y-%m-%d %H:%M").to_string(),
                    e.reference.clone().unwrap_or_default(),
                ])
            })
            .collect::<Result<Vec<_>>>()?;
        println!(
            "{}",
            pretty_table(
                &["Entry", "Tx", "Account", "Amount", "Incurred", "Reference"],
                rows
            )
        );
    }
    Ok(())
}
