// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn name_arg() -> Arg {
    Arg::new("name").long("name").required(true)
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Create an account")
                .arg(name_arg())
                .arg(
                    Arg::new("type")
                        .long("type")
                        .default_value("cash")
                        .help("cash|envelope|asset|receivable|payable|expense|income"),
                )
                .arg(Arg::new("currency").long("currency").help("Defaults to the configured currency"))
                .arg(Arg::new("initial").long("initial").default_value("0")),
        )
        .subcommand(json_args(Command::new("list").about("List accounts with balances")))
        .subcommand(Command::new("rm").about("Delete an account without entries").arg(name_arg()))
        .subcommand(
            Command::new("rename")
                .about("Rename an account")
                .arg(name_arg())
                .arg(Arg::new("to").long("to").required(true)),
        )
        .subcommand(
            Command::new("set-initial")
                .about("Change the opening balance")
                .arg(name_arg())
                .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true)),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(Command::new("add").arg(name_arg()))
        .subcommand(Command::new("list"))
        .subcommand(Command::new("rm").arg(name_arg()))
}

fn number_arg() -> Arg {
    Arg::new("number")
        .long("number")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Transaction reference number")
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and inspect transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a single-entry transaction")
                .arg(Arg::new("account").long("account").required(true))
                .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                .arg(Arg::new("desc").long("desc").default_value(""))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD or RFC 3339; default now"))
                .arg(Arg::new("reference").long("reference")),
        )
        .subcommand(
            Command::new("transfer")
                .about("Move money between two accounts")
                .arg(Arg::new("from").long("from").required(true))
                .arg(Arg::new("to").long("to").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("desc").long("desc").default_value("Transfer"))
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(json_args(
            Command::new("list").arg(
                Arg::new("limit")
                    .long("limit")
                    .value_parser(value_parser!(usize)),
            ),
        ))
        .subcommand(Command::new("show").arg(number_arg()))
        .subcommand(
            Command::new("edit")
                .about("Change description or category")
                .arg(number_arg())
                .arg(Arg::new("desc").long("desc"))
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("uncategorize")
                        .long("uncategorize")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("category"),
                ),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(number_arg())
                .arg(
                    Arg::new("cascade")
                        .long("cascade")
                        .action(ArgAction::SetTrue)
                        .help("Also delete its entries and reverse their balances"),
                ),
        )
}

fn entry_id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn entry_cmd() -> Command {
    Command::new("entry")
        .about("Edit individual entries")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add an entry to an existing transaction")
                .arg(number_arg())
                .arg(Arg::new("account").long("account").required(true))
                .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("reference").long("reference")),
        )
        .subcommand(
            Command::new("edit")
                .arg(entry_id_arg())
                .arg(Arg::new("amount").long("amount").allow_hyphen_values(true))
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("reference").long("reference")),
        )
        .subcommand(Command::new("rm").arg(entry_id_arg()))
        .subcommand(json_args(
            Command::new("list")
                .arg(Arg::new("account").long("account"))
                .arg(
                    Arg::new("number")
                        .long("number")
                        .value_parser(value_parser!(i64))
                        .conflicts_with("account"),
                ),
        ))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Summaries")
        .subcommand_required(true)
        .subcommand(json_args(Command::new("balances")))
        .subcommand(json_args(
            Command::new("spending").arg(Arg::new("month").long("month").required(true)),
        ))
}

fn export_cmd() -> Command {
    Command::new("export").subcommand_required(true).subcommand(
        Command::new("entries")
            .arg(Arg::new("format").long("format").default_value("csv"))
            .arg(Arg::new("out").long("out").required(true)),
    )
}

fn backup_cmd() -> Command {
    let dir = || Arg::new("dir").long("dir").help("Defaults to <data dir>/backups");
    Command::new("backup")
        .about("Copy the database file")
        .subcommand_required(true)
        .subcommand(Command::new("now").arg(dir()))
        .subcommand(Command::new("auto").about("Back up only if the interval has passed").arg(dir()))
        .subcommand(Command::new("list").arg(dir()))
        .subcommand(
            Command::new("prune")
                .arg(dir())
                .arg(Arg::new("keep").long("keep").value_parser(value_parser!(usize))),
        )
}

fn config_cmd() -> Command {
    Command::new("config")
        .about("Persistent settings")
        .subcommand_required(true)
        .subcommand(Command::new("get").arg(Arg::new("key").long("key")))
        .subcommand(
            Command::new("set")
                .arg(Arg::new("key").long("key").required(true))
                .arg(Arg::new("value").long("value").required(true)),
        )
}

pub fn build_cli() -> Command {
    Command::new("wimm")
        .about("Where Is My Money: accounts, transactions and balances")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .env("WIMM_DB")
                .global(true)
                .help("Database file (default: platform data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(account_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(entry_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(backup_cmd())
        .subcommand(
            Command::new("doctor")
                .about("Check cached balances against entries")
                .arg(Arg::new("fix").long("fix").action(ArgAction::SetTrue)),
        )
        .subcommand(config_cmd())
}
