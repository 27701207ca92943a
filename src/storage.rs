use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::debug;

use crate::account::{Account, Customer, CustomerId};
use crate::error::BankResult;

pub const CURRENT_USER_KEY: &str = "currentUser";
pub const USER_ACCOUNTS_KEY: &str = "userAccounts";
pub const KNOWN_CUSTOMER_IDS_KEY: &str = "knownCustomerIds";

/// Durable key/value snapshot store for client-side session state.
/// Values are JSON so the database stays inspectable.
#[derive(Clone)]
pub struct LocalStore {
    db: sled::Db,
}

impl LocalStore {
    pub fn open<P: AsRef<Path>>(path: P) -> BankResult<Self> {
        let db = sled::open(path.as_ref())?;
        debug!("Local store opened at {}", path.as_ref().display());
        Ok(Self { db })
    }

    /// Throwaway store, removed when dropped.
    pub fn temporary() -> BankResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    // Generic Helper: Put
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> BankResult<()> {
        let serialized = serde_json::to_vec(value)?;
        self.db.insert(key.as_bytes(), serialized)?;
        self.db.flush()?;
        Ok(())
    }

    // Generic Helper: Get
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> BankResult<Option<T>> {
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    pub fn remove(&self, key: &str) -> BankResult<()> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    // --- Specific Accessors ---

    pub fn save_user(&self, customer: &Customer) -> BankResult<()> {
        self.put(CURRENT_USER_KEY, customer)
    }

    pub fn load_user(&self) -> BankResult<Option<Customer>> {
        self.get(CURRENT_USER_KEY)
    }

    pub fn save_accounts(&self, accounts: &[Account]) -> BankResult<()> {
        self.put(USER_ACCOUNTS_KEY, &accounts)
    }

    pub fn load_accounts(&self) -> BankResult<Vec<Account>> {
        Ok(self.get(USER_ACCOUNTS_KEY)?.unwrap_or_default())
    }

    /// Drop the session snapshot. Known customer ids survive logout.
    pub fn clear_session(&self) -> BankResult<()> {
        self.remove(CURRENT_USER_KEY)?;
        self.remove(USER_ACCOUNTS_KEY)
    }

    pub fn save_known_ids(&self, ids: &[CustomerId]) -> BankResult<()> {
        self.put(KNOWN_CUSTOMER_IDS_KEY, &ids)
    }

    pub fn load_known_ids(&self) -> BankResult<Vec<CustomerId>> {
        Ok(self.get(KNOWN_CUSTOMER_IDS_KEY)?.unwrap_or_default())
    }
}
