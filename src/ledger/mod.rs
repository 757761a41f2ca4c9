// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger bookkeeping over the `account`, `money_transaction` and `entry`
//! tables.
//!
//! Every account row caches `balance_value = initial_value + sum(entries)`.
//! Each mutating function here runs in a single SQLite transaction and
//! applies the matching balance delta in that same transaction, so the
//! cache never drifts from the entries it summarises. Reads take
//! `&Connection`; writes take `&mut Connection` so they can open the
//! transaction themselves.

pub mod accounts;
pub mod categories;
pub mod consistency;
pub mod entries;
pub mod transactions;

pub use accounts::{
    account_by_name, create_account, delete_account, get_account, list_accounts, rename_account,
    update_initial_balance,
};
pub use categories::{category_by_name, create_category, delete_category, get_category, list_categories};
pub use consistency::{BalanceDrift, recompute_balances, verify_balances};
pub use entries::{
    create_entry, delete_entry, edit_entry, entries_for_account, entries_for_transaction,
    get_entry,
};
pub use transactions::{
    EntryLine, create_transaction, delete_transaction, delete_transaction_cascade,
    get_transaction, list_transactions, record_transaction, set_transaction_details,
    transaction_by_number, transaction_total,
};
