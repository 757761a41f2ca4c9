// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;
use wimm::commands::exporter;
use wimm::ledger::EntryLine;
use wimm::models::AccountType;
use wimm::{LedgerStore, cli, db};

fn base_store() -> LedgerStore {
    let mut store = LedgerStore::new(db::open_in_memory().unwrap());
    let checking = store
        .create_account("Checking", AccountType::Cash, "USD", Decimal::ZERO)
        .unwrap();
    let groceries = store.create_category("Groceries").unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    store
        .record_transaction(
            "Corner Shop",
            Some(groceries.id),
            "USD",
            at,
            &[EntryLine {
                account_id: checking.id,
                amount: Decimal::from_str_exact("-12.34").unwrap(),
                incurred_at: at,
                reference: Some("Weekly run".into()),
            }],
        )
        .unwrap();
    store
}

#[test]
fn export_entries_streams_pretty_json() {
    let store = base_store();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "wimm", "export", "entries", "--format", "json", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(store.conn(), export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let row = &parsed[0];
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(row["account"], json!("Checking"));
    assert_eq!(row["description"], json!("Corner Shop"));
    assert_eq!(row["category"], json!("Groceries"));
    assert_eq!(row["amount"], json!("-12.34"));
    assert_eq!(row["currency"], json!("USD"));
    assert_eq!(row["reference"], json!("Weekly run"));
    assert!(row["incurred_at"].as_str().unwrap().starts_with("2025-01-02"));
}

#[test]
fn export_entries_writes_csv_with_header() {
    let store = base_store();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");

    let n = exporter::export_entries(store.conn(), "csv", &out_path).unwrap();
    assert_eq!(n, 1);

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "entry");
    assert_eq!(&headers[6], "category");
    let rec = rdr.records().next().unwrap().unwrap();
    assert_eq!(&rec[4], "Checking");
    assert_eq!(&rec[7], "-12.34");
}

#[test]
fn export_entries_rejects_unknown_format() {
    let store = base_store();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "wimm", "export", "entries", "--format", "xml", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(store.conn(), export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}
