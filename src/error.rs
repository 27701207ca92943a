use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountNo;

/// Coarse classification used by the views to pick a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    Authentication,
    Internal,
}

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Decimal, available: Decimal },
    #[error("Invalid email or password")]
    AuthenticationFailed,
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Unknown account: {0}")]
    UnknownAccount(AccountNo),
    #[error("Another request is still in flight")]
    Busy,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
}

pub type BankResult<T> = Result<T, BankError>;

impl BankError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BankError::Network(_) | BankError::Backend { .. } => ErrorKind::Network,
            BankError::Validation(_)
            | BankError::InsufficientFunds { .. }
            | BankError::UnknownAccount(_)
            | BankError::Busy => ErrorKind::Validation,
            BankError::AuthenticationFailed | BankError::NotLoggedIn => ErrorKind::Authentication,
            BankError::Storage(_)
            | BankError::Serialization(_)
            | BankError::Config(_)
            | BankError::Io(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status carried by a backend rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BankError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Text shown to the user. Network and backend failures collapse into a
    /// generic retry hint; validation errors are shown as-is.
    pub fn user_message(&self) -> String {
        match self {
            BankError::Validation(msg) => msg.clone(),
            BankError::InsufficientFunds { .. } => "Insufficient funds".to_string(),
            BankError::UnknownAccount(no) => format!("Account {} not found", no),
            BankError::Busy => "Please wait for the current request to finish".to_string(),
            BankError::AuthenticationFailed => {
                "Invalid email or password. Please try again.".to_string()
            }
            BankError::NotLoggedIn => "Please log in first".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for BankError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BankError::Serialization(err.to_string())
        } else {
            BankError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BankError {
    fn from(err: serde_json::Error) -> Self {
        BankError::Serialization(err.to_string())
    }
}

impl From<sled::Error> for BankError {
    fn from(err: sled::Error) -> Self {
        BankError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for BankError {
    fn from(err: std::io::Error) -> Self {
        BankError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for BankError {
    fn from(err: toml::de::Error) -> Self {
        BankError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = BankError::Backend { status: 500, message: "boom".to_string() };
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = BankError::AuthenticationFailed;
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.user_message(), "Invalid email or password. Please try again.");

        let err = BankError::Validation("Please enter a valid amount".to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.user_message(), "Please enter a valid amount");
    }

    #[test]
    fn test_not_found() {
        assert!(BankError::Backend { status: 404, message: String::new() }.is_not_found());
        assert!(!BankError::Network("refused".to_string()).is_not_found());
    }
}
