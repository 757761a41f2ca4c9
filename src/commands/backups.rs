// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup;
use crate::settings;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

fn backup_dir(sub: &clap::ArgMatches, db_path: &Path) -> PathBuf {
    match sub.get_one::<String>("dir") {
        Some(d) => PathBuf::from(d),
        None => db_path
            .parent()
            .map(|p| p.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups")),
    }
}

pub fn handle(conn: &Connection, db_path: &Path, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("now", sub)) => {
            let dir = backup_dir(sub, db_path);
            let now = Utc::now();
            match backup::create_backup(db_path, &dir, now) {
                Some(path) => {
                    settings::set_last_backup_at(conn, now)?;
                    println!("Backup written to {}", path.display());
                }
                None => println!("No backup produced (see log)"),
            }
        }
        Some(("auto", sub)) => {
            let dir = backup_dir(sub, db_path);
            match backup::backup_if_due(conn, db_path, &dir, Utc::now())? {
                Some(path) => println!("Backup written to {}", path.display()),
                None => println!("No backup taken"),
            }
        }
        Some(("list", sub)) => {
            let dir = backup_dir(sub, db_path);
            let rows = backup::list_backups(&dir)
                .into_iter()
                .rev()
                .map(|p| vec![p.display().to_string()])
                .collect();
            println!("{}", pretty_table(&["Backup"], rows));
        }
        Some(("prune", sub)) => {
            let dir = backup_dir(sub, db_path);
            let keep = match sub.get_one::<usize>("keep") {
                Some(k) => *k,
                None => settings::backup_keep(conn)?,
            };
            let removed = backup::prune_backups(&dir, keep);
            println!("Removed {} old backup(s)", removed.len());
        }
        _ => {}
    }
    Ok(())
}
