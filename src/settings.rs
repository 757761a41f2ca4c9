// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Key/value settings persisted in the `settings` table.

use crate::error::{LedgerError, LedgerResult};
use crate::money::normalize_currency;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

pub const DEFAULT_CURRENCY: &str = "default_currency";
pub const BACKUP_KEEP: &str = "backup_keep";
pub const BACKUP_INTERVAL_HOURS: &str = "backup_interval_hours";
pub const LAST_BACKUP_AT: &str = "last_backup_at";

/// Upper bound for `backup_interval_hours` (ten years).
pub const MAX_BACKUP_INTERVAL_HOURS: i64 = 24 * 366 * 10;

/// Keys accepted by `config set`.
pub const KNOWN_KEYS: [&str; 3] = [DEFAULT_CURRENCY, BACKUP_KEEP, BACKUP_INTERVAL_HOURS];

pub fn get(conn: &Connection, key: &str) -> LedgerResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?)
}

pub fn set(conn: &Connection, key: &str, value: &str) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn get_parsed<T: std::str::FromStr>(conn: &Connection, key: &str, default: T) -> LedgerResult<T> {
    match get(conn, key)? {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            LedgerError::InvalidArgument(format!("setting {} has invalid value '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

pub fn default_currency(conn: &Connection) -> LedgerResult<String> {
    Ok(get(conn, DEFAULT_CURRENCY)?.unwrap_or_else(|| "USD".to_string()))
}

pub fn set_default_currency(conn: &Connection, ccy: &str) -> LedgerResult<()> {
    set(conn, DEFAULT_CURRENCY, &normalize_currency(ccy)?)
}

pub fn backup_keep(conn: &Connection) -> LedgerResult<usize> {
    get_parsed(conn, BACKUP_KEEP, 7)
}

pub fn backup_interval_hours(conn: &Connection) -> LedgerResult<i64> {
    get_parsed(conn, BACKUP_INTERVAL_HOURS, 24)
}

pub fn last_backup_at(conn: &Connection) -> LedgerResult<Option<DateTime<Utc>>> {
    match get(conn, LAST_BACKUP_AT)? {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| {
                LedgerError::InvalidArgument(format!("setting {} has invalid value '{}'", LAST_BACKUP_AT, raw))
            }),
        None => Ok(None),
    }
}

pub fn set_last_backup_at(conn: &Connection, at: DateTime<Utc>) -> LedgerResult<()> {
    set(conn, LAST_BACKUP_AT, &at.to_rfc3339())
}

/// Validates a user-supplied value before storing it.
pub fn set_checked(conn: &Connection, key: &str, value: &str) -> LedgerResult<()> {
    let value = value.trim();
    match key {
        DEFAULT_CURRENCY => set_default_currency(conn, value),
        BACKUP_KEEP => {
            let keep = value.parse::<usize>().ok().filter(|k| *k > 0).ok_or_else(|| {
                LedgerError::InvalidArgument(format!("{} must be a positive integer", key))
            })?;
            set(conn, key, &keep.to_string())
        }
        BACKUP_INTERVAL_HOURS => {
            let hours = value
                .parse::<i64>()
                .ok()
                .filter(|h| (0..=MAX_BACKUP_INTERVAL_HOURS).contains(h))
                .ok_or_else(|| {
                    LedgerError::InvalidArgument(format!(
                        "{} must be between 0 and {}",
                        key, MAX_BACKUP_INTERVAL_HOURS
                    ))
                })?;
            set(conn, key, &hours.to_string())
        }
        _ => Err(LedgerError::InvalidArgument(format!(
            "unknown setting '{}' (known: {})",
            key,
            KNOWN_KEYS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn defaults_apply_until_set() {
        let conn = open_in_memory().unwrap();
        assert_eq!(default_currency(&conn).unwrap(), "USD");
        assert_eq!(backup_keep(&conn).unwrap(), 7);
        assert_eq!(backup_interval_hours(&conn).unwrap(), 24);
        assert!(last_backup_at(&conn).unwrap().is_none());

        set_checked(&conn, DEFAULT_CURRENCY, "eur").unwrap();
        set_checked(&conn, BACKUP_KEEP, "3").unwrap();
        assert_eq!(default_currency(&conn).unwrap(), "EUR");
        assert_eq!(backup_keep(&conn).unwrap(), 3);
    }

    #[test]
    fn rejects_unknown_and_invalid_values() {
        let conn = open_in_memory().unwrap();
        assert!(set_checked(&conn, "theme", "dark").is_err());
        assert!(set_checked(&conn, BACKUP_KEEP, "0").is_err());
        assert!(set_checked(&conn, BACKUP_INTERVAL_HOURS, "-1").is_err());
        assert!(set_checked(&conn, BACKUP_INTERVAL_HOURS, "9000000000000000").is_err());
        assert_eq!(backup_interval_hours(&conn).unwrap(), 24);
        assert!(set_checked(&conn, DEFAULT_CURRENCY, "dollars").is_err());
    }
}
