//! Customer identity types

use serde::{Deserialize, Serialize};

use super::types::AccountNo;

/// Customer identifier assigned by the backend
pub type CustomerId = u64;

/// A customer as held by the session. Never carries a password.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub account_ids: Vec<AccountNo>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Backend representation of a customer.
///
/// Includes the stored password in plaintext; it must not leave the
/// credential resolver.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    #[serde(default)]
    pub id: Option<CustomerId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub account_ids: Vec<AccountNo>,
}

impl CustomerDto {
    pub fn password_matches(&self, password: &str) -> bool {
        !self.password.is_empty() && self.password == password
    }

    /// Drop the password. The backend may omit the email, in which case the
    /// address the user logged in with is kept.
    pub fn into_customer(self, login_email: &str) -> Customer {
        let email = if self.email.is_empty() {
            login_email.to_string()
        } else {
            self.email
        };
        Customer {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email,
            phone: self.phone,
            address: self.address,
            account_ids: self.account_ids,
        }
    }
}

// Manual impl so the password never ends up in logs
impl std::fmt::Debug for CustomerDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerDto")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("account_ids", &self.account_ids)
            .finish()
    }
}

/// Signup payload for `POST /customers`
#[derive(Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .finish()
    }
}
