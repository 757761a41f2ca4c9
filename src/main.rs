// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use wimm::{LedgerStore, cli, commands, db, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    logging::init(matches.get_flag("verbose"));

    let explicit = matches.get_one::<String>("db").map(PathBuf::from);
    let path = db::resolve_db_path(explicit.as_deref())?;
    let mut store = LedgerStore::new(db::open_or_init(&path)?);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&mut store, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut store, sub)?,
        Some(("entry", sub)) => commands::entries::handle(&mut store, sub)?,
        Some(("report", sub)) => commands::reports::handle(store.conn(), sub)?,
        Some(("export", sub)) => commands::exporter::handle(store.conn(), sub)?,
        Some(("backup", sub)) => commands::backups::handle(store.conn(), &path, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&mut store, sub)?,
        Some(("config", sub)) => commands::config::handle(store.conn(), sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
