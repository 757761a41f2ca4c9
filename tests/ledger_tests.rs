// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use wimm::db;
use wimm::ledger::{self, EntryLine};
use wimm::models::{Account, AccountType, Entry, NewEntry};
use wimm::LedgerError;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn account(conn: &Connection, name: &str, initial: &str) -> Account {
    ledger::create_account(conn, name, AccountType::Cash, "USD", d(initial)).unwrap()
}

fn balance(conn: &Connection, id: i64) -> Decimal {
    ledger::get_account(conn, id).unwrap().balance_value
}

fn post(conn: &mut Connection, account_id: i64, amount: &str) -> Entry {
    let txn = ledger::create_transaction(conn, "test", None, "USD", at()).unwrap();
    ledger::create_entry(conn, &NewEntry::new(txn.id, account_id, d(amount), at())).unwrap()
}

#[test]
fn new_account_balance_equals_opening_balance() {
    let conn = setup();
    let a = account(&conn, "Wallet", "100.00");
    assert_eq!(a.initial_value, d("100.00"));
    assert_eq!(a.balance_value, d("100.00"));
    assert_eq!(a.balance().to_string(), "USD 100.00");
}

#[test]
fn create_edit_delete_scenario() {
    let mut conn = setup();
    let a = account(&conn, "A", "100.00");

    let entry = post(&mut conn, a.id, "50.00");
    assert_eq!(balance(&conn, a.id), d("150.00"));

    let mut modified = entry.clone();
    modified.amount = d("20.00");
    let entry = ledger::edit_entry(&mut conn, &entry, &modified).unwrap();
    assert_eq!(entry.amount, d("20.00"));
    assert_eq!(balance(&conn, a.id), d("120.00"));

    ledger::delete_entry(&mut conn, &entry).unwrap();
    assert_eq!(balance(&conn, a.id), d("100.00"));
    assert!(ledger::get_entry(&conn, entry.id).unwrap_err().is_not_found());
}

#[test]
fn moving_an_entry_adjusts_both_accounts() {
    let mut conn = setup();
    let a = account(&conn, "A", "100.00");
    let b = account(&conn, "B", "0.00");
    let entry = post(&mut conn, a.id, "-30.00");
    assert_eq!(balance(&conn, a.id), d("70.00"));

    let mut moved = entry.clone();
    moved.account_id = b.id;
    ledger::edit_entry(&mut conn, &entry, &moved).unwrap();

    assert_eq!(balance(&conn, a.id), d("100.00"));
    assert_eq!(balance(&conn, b.id), d("-30.00"));
    assert!(ledger::entries_for_account(&conn, a.id).unwrap().is_empty());
    assert_eq!(ledger::entries_for_account(&conn, b.id).unwrap().len(), 1);
}

#[test]
fn moving_with_new_amount_uses_original_and_new_amounts() {
    let mut conn = setup();
    let a = account(&conn, "A", "100.00");
    let b = account(&conn, "B", "0.00");
    // A had 100 before the entry and 130 after a +30 posting.
    let entry = post(&mut conn, a.id, "30.00");
    assert_eq!(balance(&conn, a.id), d("130.00"));

    let mut moved = entry.clone();
    moved.account_id = b.id;
    moved.amount = d("-30.00");
    ledger::edit_entry(&mut conn, &entry, &moved).unwrap();

    assert_eq!(balance(&conn, a.id), d("100.00"));
    assert_eq!(balance(&conn, b.id), d("-30.00"));
}

#[test]
fn move_to_account_in_other_currency_changes_nothing() {
    let mut conn = setup();
    let a = account(&conn, "A", "100.00");
    let eur = ledger::create_account(&conn, "Euro", AccountType::Cash, "EUR", d("0")).unwrap();
    let entry = post(&mut conn, a.id, "-30.00");

    let mut moved = entry.clone();
    moved.account_id = eur.id;
    let err = ledger::edit_entry(&mut conn, &entry, &moved).unwrap_err();
    assert!(matches!(err, LedgerError::CurrencyMismatch { .. }));

    assert_eq!(balance(&conn, a.id), d("70.00"));
    assert_eq!(balance(&conn, eur.id), d("0"));
    assert_eq!(ledger::get_entry(&conn, entry.id).unwrap().account_id, a.id);
}

#[test]
fn update_initial_balance_applies_delta() {
    let mut conn = setup();
    let a = account(&conn, "A", "100.00");
    post(&mut conn, a.id, "-25.00");
    let before = ledger::get_account(&conn, a.id).unwrap();
    assert_eq!(before.balance_value, d("75.00"));

    let after = ledger::update_initial_balance(&mut conn, a.id, d("40.00")).unwrap();
    assert_eq!(after.initial_value, d("40.00"));
    assert_eq!(
        after.balance_value,
        before.balance_value + (d("40.00") - before.initial_value)
    );
    assert_eq!(after.balance_value, d("15.00"));
    assert!(ledger::verify_balances(&conn).unwrap().is_empty());
}

#[test]
fn delete_then_recreate_restores_balance() {
    let mut conn = setup();
    let a = account(&conn, "A", "10.00");
    let entry = post(&mut conn, a.id, "-4.50");
    let with_entry = balance(&conn, a.id);

    ledger::delete_entry(&mut conn, &entry).unwrap();
    assert_eq!(balance(&conn, a.id), d("10.00"));

    let mut again = NewEntry::new(entry.transaction_id, a.id, entry.amount, entry.incurred_at);
    again.recorded_at = entry.recorded_at;
    ledger::create_entry(&mut conn, &again).unwrap();
    assert_eq!(balance(&conn, a.id), with_entry);
}

#[test]
fn missing_account_or_transaction_is_not_found() {
    let mut conn = setup();
    let a = account(&conn, "A", "0");
    let txn = ledger::create_transaction(&mut conn, "x", None, "USD", at()).unwrap();

    let err = ledger::create_entry(&mut conn, &NewEntry::new(txn.id, 999, d("1"), at())).unwrap_err();
    assert!(err.is_not_found());
    let err = ledger::create_entry(&mut conn, &NewEntry::new(999, a.id, d("1"), at())).unwrap_err();
    assert!(err.is_not_found());
    assert!(ledger::account_by_name(&conn, "nope").unwrap_err().is_not_found());
    assert!(ledger::transaction_by_number(&conn, 1).unwrap_err().is_not_found());
    assert_eq!(balance(&conn, a.id), d("0"));
}

#[test]
fn entry_in_foreign_currency_is_rejected() {
    let mut conn = setup();
    let a = account(&conn, "A", "0");
    let txn = ledger::create_transaction(&mut conn, "trip", None, "eur", at()).unwrap();
    assert_eq!(txn.currency, "EUR");
    let err = ledger::create_entry(&mut conn, &NewEntry::new(txn.id, a.id, d("5"), at())).unwrap_err();
    assert!(matches!(err, LedgerError::CurrencyMismatch { .. }));
    assert!(ledger::entries_for_transaction(&conn, txn.id).unwrap().is_empty());
}

#[test]
fn stale_copy_cannot_edit_or_delete() {
    let mut conn = setup();
    let a = account(&conn, "A", "0");
    let entry = post(&mut conn, a.id, "5");
    let mut newer = entry.clone();
    newer.amount = d("8");
    ledger::edit_entry(&mut conn, &entry, &newer).unwrap();

    let mut again = entry.clone();
    again.amount = d("1");
    assert!(matches!(
        ledger::edit_entry(&mut conn, &entry, &again),
        Err(LedgerError::StaleEntry(_))
    ));
    assert!(matches!(
        ledger::delete_entry(&mut conn, &entry),
        Err(LedgerError::StaleEntry(_))
    ));
    assert_eq!(balance(&conn, a.id), d("8"));
}

#[test]
fn transaction_numbers_are_unique_and_increasing() {
    let mut conn = setup();
    let t1 = ledger::create_transaction(&mut conn, "a", None, "USD", at()).unwrap();
    let t2 = ledger::create_transaction(&mut conn, "b", None, "USD", at()).unwrap();
    let earlier = at() - chrono::Duration::days(1);
    let t3 = ledger::create_transaction(&mut conn, "c", None, "USD", earlier).unwrap();

    assert_eq!(t1.number, at().timestamp_millis());
    assert_eq!(t2.number, t1.number + 1);
    assert_eq!(t3.number, t2.number + 1);

    let listed = ledger::list_transactions(&conn, Some(2)).unwrap();
    assert_eq!(
        listed.iter().map(|t| t.number).collect::<Vec<_>>(),
        vec![t3.number, t2.number]
    );
}

#[test]
fn transaction_total_sums_entries() {
    let mut conn = setup();
    let a = account(&conn, "A", "0");
    let b = account(&conn, "B", "0");
    let lines = [
        EntryLine {
            account_id: a.id,
            amount: d("-12.00"),
            incurred_at: at(),
            reference: None,
        },
        EntryLine {
            account_id: b.id,
            amount: d("-3.40"),
            incurred_at: at(),
            reference: Some("receipt 7".into()),
        },
    ];
    let (txn, entries) =
        ledger::record_transaction(&mut conn, "groceries", None, "USD", at(), &lines).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].reference.as_deref(), Some("receipt 7"));
    let total = ledger::transaction_total(&conn, txn.id).unwrap();
    assert_eq!(total.amount, d("-15.40"));
    assert_eq!(total.currency, "USD");
}

#[test]
fn record_transaction_is_all_or_nothing() {
    let mut conn = setup();
    let a = account(&conn, "A", "50");
    let lines = [
        EntryLine {
            account_id: a.id,
            amount: d("-10"),
            incurred_at: at(),
            reference: None,
        },
        EntryLine {
            account_id: 4242,
            amount: d("10"),
            incurred_at: at(),
            reference: None,
        },
    ];
    assert!(ledger::record_transaction(&mut conn, "x", None, "USD", at(), &lines).is_err());
    assert_eq!(balance(&conn, a.id), d("50"));
    assert!(ledger::list_transactions(&conn, None).unwrap().is_empty());
    assert!(ledger::record_transaction(&mut conn, "x", None, "USD", at(), &[]).is_err());
}

#[test]
fn delete_transaction_requires_no_entries() {
    let mut conn = setup();
    let a = account(&conn, "A", "0");
    let entry = post(&mut conn, a.id, "7");

    let err = ledger::delete_transaction(&mut conn, entry.transaction_id).unwrap_err();
    assert!(matches!(err, LedgerError::TransactionHasEntries(_)));

    ledger::delete_entry(&mut conn, &entry).unwrap();
    ledger::delete_transaction(&mut conn, entry.transaction_id).unwrap();
    assert!(
        ledger::get_transaction(&conn, entry.transaction_id)
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn cascade_delete_reverses_every_entry() {
    let mut conn = setup();
    let a = account(&conn, "A", "100");
    let b = account(&conn, "B", "0");
    let lines = [
        EntryLine {
            account_id: a.id,
            amount: d("-40"),
            incurred_at: at(),
            reference: None,
        },
        EntryLine {
            account_id: b.id,
            amount: d("40"),
            incurred_at: at(),
            reference: None,
        },
    ];
    let (txn, _) = ledger::record_transaction(&mut conn, "move", None, "USD", at(), &lines).unwrap();
    assert_eq!(balance(&conn, a.id), d("60"));

    let touched = ledger::delete_transaction_cascade(&mut conn, txn.id).unwrap();
    assert_eq!(touched, vec![a.id, b.id]);
    assert_eq!(balance(&conn, a.id), d("100"));
    assert_eq!(balance(&conn, b.id), d("0"));
    assert!(ledger::get_transaction(&conn, txn.id).is_err());
}

#[test]
fn accounts_with_entries_cannot_be_deleted() {
    let mut conn = setup();
    let a = account(&conn, "A", "0");
    let entry = post(&mut conn, a.id, "1");
    assert!(matches!(
        ledger::delete_account(&mut conn, a.id),
        Err(LedgerError::AccountHasEntries(_))
    ));
    ledger::delete_entry(&mut conn, &entry).unwrap();
    ledger::delete_account(&mut conn, a.id).unwrap();
    assert!(ledger::list_accounts(&conn).unwrap().is_empty());
}

#[test]
fn account_names_are_unique() {
    let conn = setup();
    let a = account(&conn, "Wallet", "0");
    account(&conn, "Bank", "0");
    assert!(ledger::create_account(&conn, " Wallet ", AccountType::Cash, "USD", d("0")).is_err());
    assert!(ledger::rename_account(&conn, a.id, "Bank").is_err());
    let renamed = ledger::rename_account(&conn, a.id, "Purse").unwrap();
    assert_eq!(renamed.name, "Purse");
    assert!(ledger::create_account(&conn, "X", AccountType::Cash, "dollars", d("0")).is_err());
}

#[test]
fn deleting_category_uncategorises_transactions() {
    let mut conn = setup();
    let food = ledger::create_category(&conn, "Food").unwrap();
    let txn = ledger::create_transaction(&mut conn, "lunch", Some(food.id), "USD", at()).unwrap();
    assert_eq!(txn.category_id, Some(food.id));

    ledger::delete_category(&conn, food.id).unwrap();
    assert_eq!(ledger::get_transaction(&conn, txn.id).unwrap().category_id, None);
    assert!(ledger::create_transaction(&mut conn, "x", Some(food.id), "USD", at()).is_err());
}

#[test]
fn recompute_repairs_drifted_cache() {
    let mut conn = setup();
    let a = account(&conn, "A", "10");
    post(&mut conn, a.id, "5");
    conn.execute(
        "UPDATE account SET balance_value='999' WHERE id=?1",
        [a.id],
    )
    .unwrap();

    let drift = ledger::verify_balances(&conn).unwrap();
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].cached, d("999"));
    assert_eq!(drift[0].computed, d("15"));

    let fixed = ledger::recompute_balances(&mut conn).unwrap();
    assert_eq!(fixed, drift);
    assert_eq!(balance(&conn, a.id), d("15"));
    assert!(ledger::verify_balances(&conn).unwrap().is_empty());
}

#[test]
fn overflowing_amounts_are_rejected_without_side_effects() {
    let mut conn = setup();
    let full = ledger::create_account(&conn, "Full", AccountType::Cash, "USD", Decimal::MAX).unwrap();
    let txn = ledger::create_transaction(&mut conn, "too much", None, "USD", at()).unwrap();

    let err = ledger::create_entry(&mut conn, &NewEntry::new(txn.id, full.id, d("1"), at()));
    assert!(matches!(err, Err(LedgerError::InvalidArgument(_))));
    assert_eq!(balance(&conn, full.id), Decimal::MAX);
    assert!(ledger::entries_for_account(&conn, full.id).unwrap().is_empty());

    assert!(ledger::update_initial_balance(&mut conn, full.id, Decimal::MIN).is_err());
    assert_eq!(ledger::get_account(&conn, full.id).unwrap().initial_value, Decimal::MAX);

    let other = account(&conn, "Other", "0");
    let e = post(&mut conn, other.id, "-1");
    let mut edited = e.clone();
    edited.amount = Decimal::MAX;
    assert!(ledger::edit_entry(&mut conn, &e, &edited).is_err());
    assert_eq!(balance(&conn, other.id), d("-1"));
}

#[test]
fn unreadable_stored_amount_is_a_database_error() {
    let conn = setup();
    let a = account(&conn, "Wallet", "10");
    conn.execute("UPDATE account SET balance_value='ten' WHERE id=?1", [a.id])
        .unwrap();
    assert!(matches!(
        ledger::get_account(&conn, a.id),
        Err(LedgerError::Database(_))
    ));
}
