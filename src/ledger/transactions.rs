// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::accounts::apply_delta;
use super::categories::get_category;
use super::entries::{entries_for_transaction, insert_entry};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Entry, MoneyTransaction, NewEntry};
use crate::money::{Money, normalize_currency};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

const COLUMNS: &str = "id, number, description, category_id, currency";

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<MoneyTransaction> {
    Ok(MoneyTransaction {
        id: r.get(0)?,
        number: r.get(1)?,
        description: r.get(2)?,
        category_id: r.get(3)?,
        currency: r.get(4)?,
    })
}

pub fn get_transaction(conn: &Connection, id: i64) -> LedgerResult<MoneyTransaction> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM money_transaction WHERE id=?1"),
        params![id],
        transaction_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("transaction", id))
}

pub fn transaction_by_number(conn: &Connection, number: i64) -> LedgerResult<MoneyTransaction> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM money_transaction WHERE number=?1"),
        params![number],
        transaction_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("transaction", format!("#{}", number)))
}

/// Newest first.
pub fn list_transactions(
    conn: &Connection,
    limit: Option<usize>,
) -> LedgerResult<Vec<MoneyTransaction>> {
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM money_transaction ORDER BY number DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], transaction_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// The number is the creation instant in milliseconds, bumped past the
/// current maximum when two transactions land in the same millisecond or
/// the clock steps backwards.
fn insert_transaction(
    conn: &Connection,
    description: &str,
    category_id: Option<i64>,
    currency: &str,
    created_at: DateTime<Utc>,
) -> LedgerResult<MoneyTransaction> {
    let currency = normalize_currency(currency)?;
    if let Some(cat) = category_id {
        get_category(conn, cat)?;
    }
    let last: Option<i64> =
        conn.query_row("SELECT MAX(number) FROM money_transaction", [], |r| r.get(0))?;
    let stamp = created_at.timestamp_millis();
    let number = match last {
        Some(n) if n >= stamp => n + 1,
        _ => stamp,
    };
    conn.execute(
        "INSERT INTO money_transaction(number, description, category_id, currency)
         VALUES (?1, ?2, ?3, ?4)",
        params![number, description.trim(), category_id, currency],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(transaction = id, number, "transaction created");
    get_transaction(conn, id)
}

pub fn create_transaction(
    conn: &mut Connection,
    description: &str,
    category_id: Option<i64>,
    currency: &str,
    created_at: DateTime<Utc>,
) -> LedgerResult<MoneyTransaction> {
    let tx = conn.transaction()?;
    let txn = insert_transaction(&tx, description, category_id, currency, created_at)?;
    tx.commit()?;
    Ok(txn)
}

/// One line of a transaction recorded in a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    pub account_id: i64,
    pub amount: Decimal,
    pub incurred_at: DateTime<Utc>,
    pub reference: Option<String>,
}

/// Creates the transaction and all of its entries as one unit: either
/// everything is posted or nothing is.
pub fn record_transaction(
    conn: &mut Connection,
    description: &str,
    category_id: Option<i64>,
    currency: &str,
    created_at: DateTime<Utc>,
    lines: &[EntryLine],
) -> LedgerResult<(MoneyTransaction, Vec<Entry>)> {
    if lines.is_empty() {
        return Err(LedgerError::InvalidArgument(
            "a transaction needs at least one entry".into(),
        ));
    }
    let tx = conn.transaction()?;
    let txn = insert_transaction(&tx, description, category_id, currency, created_at)?;
    for line in lines {
        let new = NewEntry {
            transaction_id: txn.id,
            account_id: line.account_id,
            amount: line.amount,
            incurred_at: line.incurred_at,
            recorded_at: created_at,
            reference: line.reference.clone(),
        };
        insert_entry(&tx, &txn, &new)?;
    }
    tx.commit()?;
    let entries = entries_for_transaction(conn, txn.id)?;
    Ok((txn, entries))
}

pub fn set_transaction_details(
    conn: &Connection,
    id: i64,
    description: &str,
    category_id: Option<i64>,
) -> LedgerResult<MoneyTransaction> {
    get_transaction(conn, id)?;
    if let Some(cat) = category_id {
        get_category(conn, cat)?;
    }
    conn.execute(
        "UPDATE money_transaction SET description=?1, category_id=?2 WHERE id=?3",
        params![description.trim(), category_id, id],
    )?;
    get_transaction(conn, id)
}

/// Sum of the transaction's entries, in the transaction's currency.
pub fn transaction_total(conn: &Connection, id: i64) -> LedgerResult<Money> {
    let txn = get_transaction(conn, id)?;
    let amounts: Vec<Money> = entries_for_transaction(conn, id)?
        .into_iter()
        .map(|e| Money::new(e.amount, &txn.currency))
        .collect();
    Money::sum(&txn.currency, &amounts)
}

/// Only removes transactions that no longer carry entries.
pub fn delete_transaction(conn: &mut Connection, id: i64) -> LedgerResult<()> {
    let tx = conn.transaction()?;
    get_transaction(&tx, id)?;
    let entries: i64 = tx.query_row(
        "SELECT COUNT(*) FROM entry WHERE transaction_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if entries > 0 {
        return Err(LedgerError::TransactionHasEntries(id));
    }
    tx.execute("DELETE FROM money_transaction WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(transaction = id, "transaction deleted");
    Ok(())
}

/// Deletes every entry of the transaction, reversing each from its
/// account, then the transaction itself. Returns the touched account ids.
pub fn delete_transaction_cascade(conn: &mut Connection, id: i64) -> LedgerResult<Vec<i64>> {
    let tx = conn.transaction()?;
    let txn = get_transaction(&tx, id)?;
    let entries = entries_for_transaction(&tx, id)?;
    let mut touched = Vec::with_capacity(entries.len());
    for entry in &entries {
        tx.execute("DELETE FROM entry WHERE id=?1", params![entry.id])?;
        apply_delta(&tx, entry.account_id, &Money::new(-entry.amount, &txn.currency))?;
        if !touched.contains(&entry.account_id) {
            touched.push(entry.account_id);
        }
    }
    tx.execute("DELETE FROM money_transaction WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(
        transaction = id,
        entries = entries.len(),
        "transaction deleted with entries"
    );
    Ok(touched)
}
