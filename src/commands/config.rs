// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let keys: Vec<&str> = match sub.get_one::<String>("key") {
                Some(k) => vec![k.as_str()],
                None => settings::KNOWN_KEYS
                    .iter()
                    .copied()
                    .chain([settings::LAST_BACKUP_AT])
                    .collect(),
            };
            let mut rows = Vec::new();
            for key in keys {
                let value = match key {
                    settings::DEFAULT_CURRENCY => settings::default_currency(conn)?,
                    settings::BACKUP_KEEP => settings::backup_keep(conn)?.to_string(),
                    settings::BACKUP_INTERVAL_HOURS => {
                        settings::backup_interval_hours(conn)?.to_string()
                    }
                    _ => settings::get(conn, key)?.unwrap_or_default(),
                };
                rows.push(vec![key.to_string(), value]);
            }
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            settings::set_checked(conn, key, value)?;
            println!("Set {} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}
