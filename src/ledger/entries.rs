// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::accounts::{apply_delta, get_account};
use super::transactions::get_transaction;
use crate::db::decimal_at;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Entry, MoneyTransaction, NewEntry};
use crate::money::{Money, sub_amounts};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, transaction_id, account_id, amount, incurred_at, recorded_at, reference";

fn entry_from_row(r: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: r.get(0)?,
        transaction_id: r.get(1)?,
        account_id: r.get(2)?,
        amount: decimal_at(r, 3)?,
        incurred_at: r.get(4)?,
        recorded_at: r.get(5)?,
        reference: r.get(6)?,
    })
}

pub fn get_entry(conn: &Connection, id: i64) -> LedgerResult<Entry> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM entry WHERE id=?1"),
        params![id],
        entry_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("entry", id))
}

pub fn entries_for_transaction(conn: &Connection, transaction_id: i64) -> LedgerResult<Vec<Entry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM entry WHERE transaction_id=?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![transaction_id], entry_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Newest incurred first.
pub fn entries_for_account(conn: &Connection, account_id: i64) -> LedgerResult<Vec<Entry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM entry WHERE account_id=?1 ORDER BY incurred_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![account_id], entry_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// The entry's amount is denominated in its transaction's currency, so the
/// target account must hold that same currency.
fn posting(
    conn: &Connection,
    txn: &MoneyTransaction,
    account_id: i64,
    amount: rust_decimal::Decimal,
) -> LedgerResult<Money> {
    let account = get_account(conn, account_id)?;
    if account.currency != txn.currency {
        return Err(LedgerError::CurrencyMismatch {
            left: account.currency,
            right: txn.currency.clone(),
        });
    }
    Ok(Money::new(amount, &txn.currency))
}

/// Writes the row and its balance delta. Must run inside the caller's
/// SQLite transaction.
pub(crate) fn insert_entry(
    conn: &Connection,
    txn: &MoneyTransaction,
    new: &NewEntry,
) -> LedgerResult<i64> {
    if new.transaction_id != txn.id {
        return Err(LedgerError::InvalidArgument(format!(
            "entry targets transaction {} but was posted to {}",
            new.transaction_id, txn.id
        )));
    }
    let delta = posting(conn, txn, new.account_id, new.amount)?;
    conn.execute(
        "INSERT INTO entry(transaction_id, account_id, amount, incurred_at, recorded_at, reference)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.transaction_id,
            new.account_id,
            new.amount.to_string(),
            new.incurred_at,
            new.recorded_at,
            new.reference
        ],
    )?;
    let id = conn.last_insert_rowid();
    apply_delta(conn, new.account_id, &delta)?;
    tracing::debug!(
        entry = id,
        transaction = new.transaction_id,
        account = new.account_id,
        amount = %new.amount,
        "entry created"
    );
    Ok(id)
}

/// Inserts the entry and adds its amount to the account balance.
pub fn create_entry(conn: &mut Connection, new: &NewEntry) -> LedgerResult<Entry> {
    let tx = conn.transaction()?;
    let txn = get_transaction(&tx, new.transaction_id)?;
    let id = insert_entry(&tx, &txn, new)?;
    tx.commit()?;
    get_entry(conn, id)
}

fn ensure_current(stored: &Entry, original: &Entry) -> LedgerResult<()> {
    if stored.account_id != original.account_id || stored.amount != original.amount {
        return Err(LedgerError::StaleEntry(original.id));
    }
    Ok(())
}

/// Rewrites an entry from `original` to `modified`.
///
/// With the same account only the difference `modified - original` is
/// applied. When the account changes the original amount leaves the old
/// account and the new amount lands on the new one in the same SQLite
/// transaction as the row update.
pub fn edit_entry(conn: &mut Connection, original: &Entry, modified: &Entry) -> LedgerResult<Entry> {
    if original.id != modified.id {
        return Err(LedgerError::InvalidArgument(format!(
            "cannot edit entry {} into entry {}",
            original.id, modified.id
        )));
    }
    if original.transaction_id != modified.transaction_id {
        return Err(LedgerError::InvalidArgument(format!(
            "entry {} cannot change transaction",
            original.id
        )));
    }

    let tx = conn.transaction()?;
    let stored = get_entry(&tx, original.id)?;
    ensure_current(&stored, original)?;
    let txn = get_transaction(&tx, original.transaction_id)?;

    if modified.account_id == original.account_id {
        let delta = Money::new(sub_amounts(modified.amount, original.amount)?, &txn.currency);
        if !delta.is_zero() {
            apply_delta(&tx, original.account_id, &delta)?;
        }
    } else {
        let incoming = posting(&tx, &txn, modified.account_id, modified.amount)?;
        apply_delta(
            &tx,
            original.account_id,
            &Money::new(-original.amount, &txn.currency),
        )?;
        apply_delta(&tx, modified.account_id, &incoming)?;
    }

    tx.execute(
        "UPDATE entry SET account_id=?1, amount=?2, incurred_at=?3, recorded_at=?4, reference=?5
         WHERE id=?6",
        params![
            modified.account_id,
            modified.amount.to_string(),
            modified.incurred_at,
            modified.recorded_at,
            modified.reference,
            modified.id
        ],
    )?;
    tx.commit()?;
    tracing::debug!(
        entry = modified.id,
        from_account = original.account_id,
        to_account = modified.account_id,
        from_amount = %original.amount,
        to_amount = %modified.amount,
        "entry edited"
    );
    get_entry(conn, modified.id)
}

/// Removes the entry and takes its amount back out of the account.
pub fn delete_entry(conn: &mut Connection, entry: &Entry) -> LedgerResult<()> {
    let tx = conn.transaction()?;
    let stored = get_entry(&tx, entry.id)?;
    ensure_current(&stored, entry)?;
    let txn = get_transaction(&tx, stored.transaction_id)?;
    tx.execute("DELETE FROM entry WHERE id=?1", params![stored.id])?;
    apply_delta(
        &tx,
        stored.account_id,
        &Money::new(-stored.amount, &txn.currency),
    )?;
    tx.commit()?;
    tracing::debug!(entry = stored.id, account = stored.account_id, "entry deleted");
    Ok(())
}
