//! Account type definitions

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::customer::CustomerId;

/// Account number assigned by the backend
pub type AccountNo = u64;

/// Different types of accounts
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountType {
    #[serde(alias = "SAVINGS", alias = "savings")]
    Savings,
    #[serde(alias = "CHECKING", alias = "checking")]
    Checking,
    #[serde(alias = "BUSINESS", alias = "business")]
    Business,
}

impl AccountType {
    pub fn all() -> [AccountType; 3] {
        [AccountType::Savings, AccountType::Checking, AccountType::Business]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "Savings",
            AccountType::Checking => "Checking",
            AccountType::Business => "Business",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Ok(AccountType::Savings),
            "checking" => Ok(AccountType::Checking),
            "business" => Ok(AccountType::Business),
            _ => Err(format!("Invalid account type: {}. Allowed: savings, checking, business", s)),
        }
    }
}

/// A customer-owned ledger as reported by the backend
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_type: AccountType,
    #[serde(default)]
    pub customer_name: String,
    pub customer_id: CustomerId,
    pub balance: Decimal,
    #[serde(default)]
    pub transaction_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_no: Option<AccountNo>,
}

impl Account {
    pub fn is_numbered(&self) -> bool {
        self.account_no.is_some()
    }

    pub fn label(&self) -> String {
        match self.account_no {
            Some(no) => format!("{} Account #{}", self.account_type, no),
            None => format!("{} Account (N/A)", self.account_type),
        }
    }
}

/// Body of the deposit and withdraw calls
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AmountRequest {
    pub amount: Decimal,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
}

impl AmountRequest {
    pub fn today(amount: Decimal) -> Self {
        Self::on(amount, Utc::now().date_naive())
    }

    pub fn on(amount: Decimal, date: NaiveDate) -> Self {
        Self {
            amount,
            date: date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Body of `POST /accounts/customer/{id}`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountRequest {
    pub account_type: AccountType,
    pub balance: Decimal,
}
