//! Transaction records

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::AccountNo;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
    #[serde(alias = "DEPOSIT", alias = "deposit")]
    Deposit,
    #[serde(alias = "WITHDRAWAL", alias = "WITHDRAW", alias = "Withdraw", alias = "withdrawal")]
    Withdrawal,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Deposit => f.pad("Deposit"),
            TransactionType::Withdrawal => f.pad("Withdrawal"),
        }
    }
}

/// Where a transaction row came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransactionOrigin {
    /// Returned by the backend
    #[default]
    Backend,
    /// Placeholder rows generated locally for demo continuity
    Sample,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub transaction_date: String,
    pub account_no: AccountNo,
    /// Balance right after this transaction
    pub balance: Decimal,
    #[serde(skip)]
    pub origin: TransactionOrigin,
}

impl Transaction {
    pub fn is_sample(&self) -> bool {
        self.origin == TransactionOrigin::Sample
    }

    /// Display form of the date, e.g. `Jan 5, 2025, 10:30 AM`.
    /// Falls back to the raw string when it cannot be parsed.
    pub fn display_date(&self) -> String {
        format_transaction_date(&self.transaction_date)
    }
}

pub fn format_transaction_date(raw: &str) -> String {
    const FORMAT: &str = "%b %-d, %Y, %I:%M %p";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_sample() { " [sample]" } else { "" };
        write!(
            f,
            "{:<10} {:>12.2}  balance {:>12.2}  {}{}",
            self.transaction_type,
            self.amount,
            self.balance,
            self.display_date(),
            marker
        )
    }
}
