// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::decimal_at;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountType};
use crate::money::{Money, add_amounts, normalize_currency, sub_amounts};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

const COLUMNS: &str = "id, name, type, currency, initial_value, balance_value";

fn account_from_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    let type_raw: String = r.get(2)?;
    let r#type = type_raw
        .parse::<AccountType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        r#type,
        currency: r.get(3)?,
        initial_value: decimal_at(r, 4)?,
        balance_value: decimal_at(r, 5)?,
    })
}

pub fn get_account(conn: &Connection, id: i64) -> LedgerResult<Account> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM account WHERE id=?1"),
        params![id],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("account", id))
}

pub fn account_by_name(conn: &Connection, name: &str) -> LedgerResult<Account> {
    let name = name.trim();
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM account WHERE name=?1"),
        params![name],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("account", format!("'{}'", name)))
}

pub fn list_accounts(conn: &Connection) -> LedgerResult<Vec<Account>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM account ORDER BY name"))?;
    let rows = stmt.query_map([], account_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn ensure_name_free(conn: &Connection, name: &str) -> LedgerResult<()> {
    if name.is_empty() {
        return Err(LedgerError::InvalidArgument("account name is empty".into()));
    }
    let taken: Option<i64> = conn
        .query_row("SELECT id FROM account WHERE name=?1", params![name], |r| {
            r.get(0)
        })
        .optional()?;
    if taken.is_some() {
        return Err(LedgerError::InvalidArgument(format!(
            "account '{}' already exists",
            name
        )));
    }
    Ok(())
}

/// New accounts start with `balance_value == initial_value`.
pub fn create_account(
    conn: &Connection,
    name: &str,
    r#type: AccountType,
    currency: &str,
    initial_balance: Decimal,
) -> LedgerResult<Account> {
    let name = name.trim();
    let currency = normalize_currency(currency)?;
    ensure_name_free(conn, name)?;
    conn.execute(
        "INSERT INTO account(name, type, currency, initial_value, balance_value)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, r#type.as_str(), currency, initial_balance.to_string()],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(account = id, account_name = name, %currency, initial = %initial_balance, "account created");
    get_account(conn, id)
}

pub fn rename_account(conn: &Connection, id: i64, new_name: &str) -> LedgerResult<Account> {
    let new_name = new_name.trim();
    let account = get_account(conn, id)?;
    if account.name != new_name {
        ensure_name_free(conn, new_name)?;
        conn.execute(
            "UPDATE account SET name=?1 WHERE id=?2",
            params![new_name, id],
        )?;
    }
    get_account(conn, id)
}

/// Refuses while entries still point at the account.
pub fn delete_account(conn: &mut Connection, id: i64) -> LedgerResult<()> {
    let tx = conn.transaction()?;
    let account = get_account(&tx, id)?;
    let entries: i64 = tx.query_row(
        "SELECT COUNT(*) FROM entry WHERE account_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if entries > 0 {
        return Err(LedgerError::AccountHasEntries(account.name));
    }
    tx.execute("DELETE FROM account WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(account = id, account_name = %account.name, "account deleted");
    Ok(())
}

/// Moves the opening balance and shifts the cached balance by the same
/// delta, without re-summing entries.
pub fn update_initial_balance(
    conn: &mut Connection,
    id: i64,
    new_initial: Decimal,
) -> LedgerResult<Account> {
    let tx = conn.transaction()?;
    let account = get_account(&tx, id)?;
    let delta = sub_amounts(new_initial, account.initial_value)?;
    let balance = add_amounts(account.balance_value, delta)?;
    tx.execute(
        "UPDATE account SET initial_value=?1, balance_value=?2 WHERE id=?3",
        params![new_initial.to_string(), balance.to_string(), id],
    )?;
    tx.commit()?;
    tracing::debug!(account = id, %delta, "initial balance updated");
    get_account(conn, id)
}

/// Adds `delta` to the cached balance of `account_id`.
///
/// Must run inside the caller's SQLite transaction. The delta has to be in
/// the account's currency.
pub(crate) fn apply_delta(conn: &Connection, account_id: i64, delta: &Money) -> LedgerResult<()> {
    let account = get_account(conn, account_id)?;
    let balance = account.balance().checked_add(delta)?;
    conn.execute(
        "UPDATE account SET balance_value=?1 WHERE id=?2",
        params![balance.amount.to_string(), account_id],
    )?;
    tracing::trace!(account = account_id, delta = %delta, balance = %balance, "balance adjusted");
    Ok(())
}
