// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::store::LedgerStore;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let category = store.create_category(name)?;
            println!("Added category '{}'", category.name);
        }
        Some(("list", _)) => {
            let data = ledger::list_categories(store.conn())?
                .into_iter()
                .map(|c| vec![c.name])
                .collect();
            println!("{}", pretty_table(&["Category"], data));
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let category = ledger::category_by_name(store.conn(), name)?;
            store.delete_category(category.id)?;
            println!("Removed category '{}'", category.name);
        }
        _ => {}
    }
    Ok(())
}
