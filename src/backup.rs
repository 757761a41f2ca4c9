// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Periodic copies of the database file with a bounded retention.
//!
//! Backups are best effort: a failed copy is logged and reported as "no
//! backup produced" instead of failing the caller. The copy assumes no
//! write is in flight on the database.

use crate::error::{LedgerError, LedgerResult};
use crate::settings;
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

const PREFIX: &str = "wimm-";
const SUFFIX: &str = ".sqlite";

pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!("{}{}{}", PREFIX, at.format("%Y%m%d-%H%M%S-%3f"), SUFFIX)
}

fn is_backup_name(name: &str) -> bool {
    name.starts_with(PREFIX) && name.ends_with(SUFFIX)
}

/// Copies `db_path` into `dir`. Returns `None` when nothing was written.
pub fn create_backup(db_path: &Path, dir: &Path, now: DateTime<Utc>) -> Option<PathBuf> {
    if let Err(err) = fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), %err, "cannot create backup directory");
        return None;
    }
    let target = dir.join(backup_file_name(now));
    match fs::copy(db_path, &target) {
        Ok(bytes) => {
            tracing::info!(path = %target.display(), bytes, "backup written");
            Some(target)
        }
        Err(err) => {
            tracing::warn!(source = %db_path.display(), %err, "backup failed");
            None
        }
    }
}

/// Backup files in `dir`, oldest first. A missing directory has none.
pub fn list_backups(dir: &Path) -> Vec<PathBuf> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = read
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_backup_name)
        })
        .collect();
    // timestamped names sort chronologically
    found.sort();
    found
}

/// Keeps the newest `keep` backups and removes the rest. Returns the
/// paths actually removed.
pub fn prune_backups(dir: &Path, keep: usize) -> Vec<PathBuf> {
    let backups = list_backups(dir);
    let excess = backups.len().saturating_sub(keep);
    let mut removed = Vec::with_capacity(excess);
    for path in backups.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(err) => tracing::warn!(path = %path.display(), %err, "cannot remove old backup"),
        }
    }
    removed
}

pub fn is_due(
    last: Option<DateTime<Utc>>,
    interval_hours: i64,
    now: DateTime<Utc>,
) -> LedgerResult<bool> {
    let interval = Duration::try_hours(interval_hours).ok_or_else(|| {
        LedgerError::InvalidArgument(format!(
            "backup interval of {} hours is out of range",
            interval_hours
        ))
    })?;
    Ok(match last {
        None => true,
        Some(last) => now - last >= interval,
    })
}

/// Takes a backup when the configured interval has passed since the last
/// one, records when it happened and prunes to the configured retention.
pub fn backup_if_due(
    conn: &Connection,
    db_path: &Path,
    dir: &Path,
    now: DateTime<Utc>,
) -> LedgerResult<Option<PathBuf>> {
    let last = settings::last_backup_at(conn)?;
    if !is_due(last, settings::backup_interval_hours(conn)?, now)? {
        tracing::debug!(?last, "backup not due");
        return Ok(None);
    }
    let Some(path) = create_backup(db_path, dir, now) else {
        return Ok(None);
    };
    settings::set_last_backup_at(conn, now)?;
    prune_backups(dir, settings::backup_keep(conn)?);
    Ok(Some(path))
}
