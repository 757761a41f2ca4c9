// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("entries", sub)) => {
            let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
            let out = sub.get_one::<String>("out").unwrap();
            let n = export_entries(conn, &fmt, Path::new(out))?;
            println!("Exported {} entries to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
pub struct ExportRow {
    pub entry: i64,
    pub number: i64,
    pub incurred_at: String,
    pub recorded_at: String,
    pub account: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
    pub reference: String,
}

pub fn export_rows(conn: &Connection) -> Result<Vec<ExportRow>> {
    let mut stmt = conn.prepare(
        "SELECT e.id, t.number, e.incurred_at, e.recorded_at, a.name, t.description,
                COALESCE(c.name, ''), e.amount, t.currency, COALESCE(e.reference, '')
         FROM entry e
         JOIN money_transaction t ON e.transaction_id=t.id
         JOIN account a ON e.account_id=a.id
         LEFT JOIN category c ON t.category_id=c.id
         ORDER BY e.incurred_at, e.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(ExportRow {
            entry: r.get(0)?,
            number: r.get(1)?,
            incurred_at: r.get(2)?,
            recorded_at: r.get(3)?,
            account: r.get(4)?,
            description: r.get(5)?,
            category: r.get(6)?,
            amount: r.get(7)?,
            currency: r.get(8)?,
            reference: r.get(9)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Writes every entry to `out` as `csv` or `json`; returns the row count.
pub fn export_entries(conn: &Connection, fmt: &str, out: &Path) -> Result<usize> {
    let rows = export_rows(conn)?;
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    tracing::info!(rows = rows.len(), path = %out.display(), "entries exported");
    Ok(rows.len())
}
