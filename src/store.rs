// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Application context: owns the database connection and tells
//! subscribers about every committed ledger write.
//!
//! Callers build one `LedgerStore` and hand it to whatever needs it.
//! Subscribers run synchronously after the write has committed, so
//! anything they read back already reflects it.

use crate::error::LedgerResult;
use crate::ledger;
use crate::models::{Account, AccountType, Category, Entry, MoneyTransaction, NewEntry};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerChange {
    AccountSaved { id: i64 },
    AccountRemoved { id: i64 },
    CategorySaved { id: i64 },
    CategoryRemoved { id: i64 },
    TransactionSaved { id: i64 },
    TransactionRemoved { id: i64, accounts: Vec<i64> },
    EntrySaved { id: i64, transaction_id: i64, accounts: Vec<i64> },
    EntryRemoved { id: i64, transaction_id: i64, account_id: i64 },
    BalancesRecomputed { accounts: Vec<i64> },
}

impl LedgerChange {
    /// Whether the cached balance of `account_id` may have moved.
    pub fn touches_balance(&self, account_id: i64) -> bool {
        match self {
            LedgerChange::AccountSaved { id } => *id == account_id,
            LedgerChange::TransactionRemoved { accounts, .. }
            | LedgerChange::EntrySaved { accounts, .. }
            | LedgerChange::BalancesRecomputed { accounts } => accounts.contains(&account_id),
            LedgerChange::EntryRemoved { account_id: a, .. } => *a == account_id,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&LedgerChange)>;

pub struct LedgerStore {
    conn: Connection,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl LedgerStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn subscribe(&mut self, listener: impl Fn(&LedgerChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn publish(&self, change: LedgerChange) {
        tracing::trace!(?change, listeners = self.listeners.len(), "publishing change");
        for (_, listener) in &self.listeners {
            listener(&change);
        }
    }

    pub fn create_account(
        &mut self,
        name: &str,
        r#type: AccountType,
        currency: &str,
        initial_balance: Decimal,
    ) -> LedgerResult<Account> {
        let account = ledger::create_account(&self.conn, name, r#type, currency, initial_balance)?;
        self.publish(LedgerChange::AccountSaved { id: account.id });
        Ok(account)
    }

    pub fn rename_account(&mut self, id: i64, new_name: &str) -> LedgerResult<Account> {
        let account = ledger::rename_account(&self.conn, id, new_name)?;
        self.publish(LedgerChange::AccountSaved { id });
        Ok(account)
    }

    pub fn update_initial_balance(&mut self, id: i64, new_initial: Decimal) -> LedgerResult<Account> {
        let account = ledger::update_initial_balance(&mut self.conn, id, new_initial)?;
        self.publish(LedgerChange::AccountSaved { id });
        Ok(account)
    }

    pub fn delete_account(&mut self, id: i64) -> LedgerResult<()> {
        ledger::delete_account(&mut self.conn, id)?;
        self.publish(LedgerChange::AccountRemoved { id });
        Ok(())
    }

    pub fn create_category(&mut self, name: &str) -> LedgerResult<Category> {
        let category = ledger::create_category(&self.conn, name)?;
        self.publish(LedgerChange::CategorySaved { id: category.id });
        Ok(category)
    }

    pub fn delete_category(&mut self, id: i64) -> LedgerResult<()> {
        ledger::delete_category(&self.conn, id)?;
        self.publish(LedgerChange::CategoryRemoved { id });
        Ok(())
    }

    pub fn create_transaction(
        &mut self,
        description: &str,
        category_id: Option<i64>,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> LedgerResult<MoneyTransaction> {
        let txn =
            ledger::create_transaction(&mut self.conn, description, category_id, currency, created_at)?;
        self.publish(LedgerChange::TransactionSaved { id: txn.id });
        Ok(txn)
    }

    pub fn record_transaction(
        &mut self,
        description: &str,
        category_id: Option<i64>,
        currency: &str,
        created_at: DateTime<Utc>,
        lines: &[ledger::EntryLine],
    ) -> LedgerResult<(MoneyTransaction, Vec<Entry>)> {
        let (txn, entries) = ledger::record_transaction(
            &mut self.conn,
            description,
            category_id,
            currency,
            created_at,
            lines,
        )?;
        self.publish(LedgerChange::TransactionSaved { id: txn.id });
        for entry in &entries {
            self.publish(LedgerChange::EntrySaved {
                id: entry.id,
                transaction_id: txn.id,
                accounts: vec![entry.account_id],
            });
        }
        Ok((txn, entries))
    }

    pub fn set_transaction_details(
        &mut self,
        id: i64,
        description: &str,
        category_id: Option<i64>,
    ) -> LedgerResult<MoneyTransaction> {
        let txn = ledger::set_transaction_details(&self.conn, id, description, category_id)?;
        self.publish(LedgerChange::TransactionSaved { id });
        Ok(txn)
    }

    pub fn delete_transaction(&mut self, id: i64) -> LedgerResult<()> {
        ledger::delete_transaction(&mut self.conn, id)?;
        self.publish(LedgerChange::TransactionRemoved {
            id,
            accounts: Vec::new(),
        });
        Ok(())
    }

    pub fn delete_transaction_cascade(&mut self, id: i64) -> LedgerResult<()> {
        let accounts = ledger::delete_transaction_cascade(&mut self.conn, id)?;
        self.publish(LedgerChange::TransactionRemoved { id, accounts });
        Ok(())
    }

    pub fn create_entry(&mut self, new: &NewEntry) -> LedgerResult<Entry> {
        let entry = ledger::create_entry(&mut self.conn, new)?;
        self.publish(LedgerChange::EntrySaved {
            id: entry.id,
            transaction_id: entry.transaction_id,
            accounts: vec![entry.account_id],
        });
        Ok(entry)
    }

    pub fn edit_entry(&mut self, original: &Entry, modified: &Entry) -> LedgerResult<Entry> {
        let entry = ledger::edit_entry(&mut self.conn, original, modified)?;
        let mut accounts = vec![original.account_id];
        if modified.account_id != original.account_id {
            accounts.push(modified.account_id);
        }
        self.publish(LedgerChange::EntrySaved {
            id: entry.id,
            transaction_id: entry.transaction_id,
            accounts,
        });
        Ok(entry)
    }

    pub fn delete_entry(&mut self, entry: &Entry) -> LedgerResult<()> {
        ledger::delete_entry(&mut self.conn, entry)?;
        self.publish(LedgerChange::EntryRemoved {
            id: entry.id,
            transaction_id: entry.transaction_id,
            account_id: entry.account_id,
        });
        Ok(())
    }

    pub fn recompute_balances(&mut self) -> LedgerResult<Vec<ledger::BalanceDrift>> {
        let fixed = ledger::recompute_balances(&mut self.conn)?;
        if !fixed.is_empty() {
            self.publish(LedgerChange::BalancesRecomputed {
                accounts: fixed.iter().map(|d| d.account_id).collect(),
            });
        }
        Ok(fixed)
    }
}
