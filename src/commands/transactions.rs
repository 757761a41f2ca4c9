// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, EntryLine};
use crate::models::MoneyTransaction;
use crate::store::LedgerStore;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, parse_instant, pretty_table};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("transfer", sub)) => transfer(store, sub)?,
        Some(("list", sub)) => list(store.conn(), sub)?,
        Some(("show", sub)) => show(store.conn(), sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => remove(store, sub)?,
        _ => {}
    }
    Ok(())
}

pub(crate) fn incurred_at(sub: &clap::ArgMatches, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    match sub.get_one::<String>("date") {
        Some(raw) => parse_instant(raw),
        None => Ok(now),
    }
}

/// Looks up the transaction named by `--number`.
pub(crate) fn transaction_arg(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<MoneyTransaction> {
    let number = sub
        .get_one::<i64>("number")
        .copied()
        .context("--number is required")?;
    Ok(ledger::transaction_by_number(conn, number)?)
}

fn category_id(conn: &Connection, sub: &clap::ArgMatches) -> Result<Option<i64>> {
    match sub.get_one::<String>("category") {
        Some(name) => Ok(Some(ledger::category_by_name(conn, name)?.id)),
        None => Ok(None),
    }
}

fn add(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let now = Utc::now();
    let account = ledger::account_by_name(store.conn(), sub.get_one::<String>("account").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let desc = sub.get_one::<String>("desc").unwrap();
    let category_id = category_id(store.conn(), sub)?;
    let line = EntryLine {
        account_id: account.id,
        amount,
        incurred_at: incurred_at(sub, now)?,
        reference: sub.get_one::<String>("reference").cloned(),
    };
    let (txn, _) = store.record_transaction(desc, category_id, &account.currency, now, &[line])?;
    println!(
        "Recorded #{} {} on '{}'",
        txn.number,
        fmt_money(&amount, &account.currency),
        account.name
    );
    Ok(())
}

fn transfer(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let now = Utc::now();
    let from = ledger::account_by_name(store.conn(), sub.get_one::<String>("from").unwrap())?;
    let to = ledger::account_by_name(store.conn(), sub.get_one::<String>("to").unwrap())?;
    if from.id == to.id {
        bail!("Cannot transfer from '{}' to itself", from.name);
    }
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount.is_sign_negative() || amount.is_zero() {
        bail!("Transfer amount must be positive, got {}", amount);
    }
    let at = incurred_at(sub, now)?;
    let lines = [
        EntryLine {
            account_id: from.id,
            amount: -amount,
            incurred_at: at,
            reference: None,
        },
        EntryLine {
            account_id: to.id,
            amount,
            incurred_at: at,
            reference: None,
        },
    ];
    let desc = sub.get_one::<String>("desc").unwrap();
    let (txn, _) = store.record_transaction(desc, None, &from.currency, now, &lines)?;
    println!(
        "Transferred {} from '{}' to '{}' (#{})",
        fmt_money(&amount, &from.currency),
        from.name,
        to.name,
        txn.number
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub number: i64,
    pub description: String,
    pub category: String,
    pub currency: String,
    pub total: String,
    pub entries: usize,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let limit = sub.get_one::<usize>("limit").copied();
    let mut data = Vec::new();
    for txn in ledger::list_transactions(conn, limit)? {
        let category = match txn.category_id {
            Some(id) => ledger::get_category(conn, id)?.name,
            None => String::new(),
        };
        let total = ledger::transaction_total(conn, txn.id)?;
        let entries = ledger::entries_for_transaction(conn, txn.id)?.len();
        data.push(TransactionRow {
            number: txn.number,
            description: txn.description,
            category,
            currency: txn.currency,
            total: format!("{:.2}", total.amount),
            entries,
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.number.to_string(),
                    r.description.clone(),
                    r.category.clone(),
                    r.currency.clone(),
                    r.total.clone(),
                    r.entries.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Number", "Description", "Category", "CCY", "Total", "Entries"],
                rows
            )
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let txn = transaction_arg(conn, sub)?;
    println!("#{} {}", txn.number, txn.description);
    let rows = ledger::entries_for_transaction(conn, txn.id)?
        .into_iter()
        .map(|e| -> Result<Vec<String>> {
            Ok(vec![
                e.id.to_string(),
                ledger::get_account(conn, e.account_id)?.name,
                format!("{:.2}", e.amount),
                e.incurred_at.format("%Y-%m-%d %H:%M").to_string(),
                e.reference.unwrap_or_default(),
            ])
        })
        .collect::<Result<Vec<_>>>()?;
    println!(
        "{}",
        pretty_table(&["Entry", "Account", "Amount", "Incurred", "Reference"], rows)
    );
    println!("Total: {}", ledger::transaction_total(conn, txn.id)?);
    Ok(())
}

fn edit(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let txn = transaction_arg(store.conn(), sub)?;
    let desc = sub
        .get_one::<String>("desc")
        .cloned()
        .unwrap_or_else(|| txn.description.clone());
    let category_id = if sub.get_flag("uncategorize") {
        None
    } else {
        category_id(store.conn(), sub)?.or(txn.category_id)
    };
    let txn = store.set_transaction_details(txn.id, &desc, category_id)?;
    println!("Updated #{}", txn.number);
    Ok(())
}

fn remove(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let txn = transaction_arg(store.conn(), sub)?;
    if sub.get_flag("cascade") {
        store.delete_transaction_cascade(txn.id)?;
    } else {
        store.delete_transaction(txn.id)?;
    }
    println!("Removed #{}", txn.number);
    Ok(())
}
