// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::models::Category;
use rusqlite::{Connection, OptionalExtension, params};

pub fn get_category(conn: &Connection, id: i64) -> LedgerResult<Category> {
    conn.query_row(
        "SELECT id, name FROM category WHERE id=?1",
        params![id],
        |r| {
            Ok(Category {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("category", id))
}

pub fn category_by_name(conn: &Connection, name: &str) -> LedgerResult<Category> {
    let name = name.trim();
    conn.query_row(
        "SELECT id, name FROM category WHERE name=?1",
        params![name],
        |r| {
            Ok(Category {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("category", format!("'{}'", name)))
}

pub fn list_categories(conn: &Connection) -> LedgerResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM category ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn create_category(conn: &Connection, name: &str) -> LedgerResult<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidArgument("category name is empty".into()));
    }
    if category_by_name(conn, name).is_ok() {
        return Err(LedgerError::InvalidArgument(format!(
            "category '{}' already exists",
            name
        )));
    }
    conn.execute("INSERT INTO category(name) VALUES (?1)", params![name])?;
    get_category(conn, conn.last_insert_rowid())
}

/// Transactions filed under the category become uncategorised.
pub fn delete_category(conn: &Connection, id: i64) -> LedgerResult<()> {
    let removed = conn.execute("DELETE FROM category WHERE id=?1", params![id])?;
    if removed == 0 {
        return Err(LedgerError::not_found("category", id));
    }
    Ok(())
}
