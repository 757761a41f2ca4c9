// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::AccountType;
use crate::settings;
use crate::store::LedgerStore;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let typ = sub.get_one::<String>("type").unwrap().parse::<AccountType>()?;
            let ccy = match sub.get_one::<String>("currency") {
                Some(c) => c.clone(),
                None => settings::default_currency(store.conn())?,
            };
            let initial = parse_decimal(sub.get_one::<String>("initial").unwrap())?;
            let account = store.create_account(name, typ, &ccy, initial)?;
            println!(
                "Added account '{}' ({}, {})",
                account.name,
                account.r#type,
                fmt_money(&account.initial_value, &account.currency)
            );
        }
        Some(("list", sub)) => {
            let accounts = ledger::list_accounts(store.conn())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let data = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.name.clone(),
                            a.r#type.to_string(),
                            a.currency.clone(),
                            format!("{:.2}", a.initial_value),
                            format!("{:.2}", a.balance_value),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Type", "Currency", "Initial", "Balance"], data)
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let account = ledger::account_by_name(store.conn(), name)?;
            store.delete_account(account.id)?;
            println!("Removed account '{}'", account.name);
        }
        Some(("rename", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let to = sub.get_one::<String>("to").unwrap();
            let account = ledger::account_by_name(store.conn(), name)?;
            let account = store.rename_account(account.id, to)?;
            println!("Renamed '{}' to '{}'", name, account.name);
        }
        Some(("set-initial", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let account = ledger::account_by_name(store.conn(), name)?;
            let account = store.update_initial_balance(account.id, amount)?;
            println!(
                "'{}' now opens at {} (balance {})",
                account.name,
                fmt_money(&account.initial_value, &account.currency),
                fmt_money(&account.balance_value, &account.currency)
            );
        }
        _ => {}
    }
    Ok(())
}
