use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::account::{AccountNo, Transaction, TransactionOrigin, TransactionType};

/// Per-account transaction lists, keyed by account number.
#[derive(Default)]
pub struct TransactionCache {
    entries: Mutex<HashMap<AccountNo, Vec<Transaction>>>,
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, account_no: AccountNo, transactions: Vec<Transaction>) {
        self.lock().insert(account_no, transactions);
    }

    pub fn get(&self, account_no: AccountNo) -> Vec<Transaction> {
        self.lock().get(&account_no).cloned().unwrap_or_default()
    }

    pub fn total_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AccountNo, Vec<Transaction>>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Placeholder history shown when the backend has none for an account.
/// Rows are newest first and tagged as samples.
pub fn sample_transactions(
    account_no: AccountNo,
    balance: Decimal,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let row = |kind, amount: i64, days_ago: i64, balance: Decimal| Transaction {
        transaction_type: kind,
        amount: Decimal::from(amount),
        transaction_date: (now - Duration::days(days_ago)).to_rfc3339(),
        account_no,
        balance,
        origin: TransactionOrigin::Sample,
    };

    vec![
        row(TransactionType::Deposit, 1000, 0, balance),
        row(TransactionType::Withdrawal, 500, 1, balance + Decimal::from(500)),
        row(TransactionType::Deposit, 2000, 2, balance + Decimal::from(1500)),
    ]
}
