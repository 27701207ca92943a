//! Customer credential resolution
//!
//! The backend has no credential endpoint. The resolver looks the customer up
//! by email and compares the password client-side. When configured, it falls
//! back to the legacy id probe (see [`legacy`]).

pub mod legacy;

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::account::{Customer, CustomerId};
use crate::client::BankBackend;
use crate::error::{BankError, BankResult};
use crate::storage::LocalStore;

pub use legacy::LegacyIdProbe;

pub struct CredentialResolver {
    backend: Arc<dyn BankBackend>,
    store: LocalStore,
    legacy_probe: bool,
    known_ids: Mutex<Vec<CustomerId>>,
}

impl CredentialResolver {
    pub fn new(backend: Arc<dyn BankBackend>, store: LocalStore, legacy_probe: bool) -> Self {
        let known_ids = store.load_known_ids().unwrap_or_else(|e| {
            warn!("Could not load known customer ids: {}", e);
            Vec::new()
        });
        Self {
            backend,
            store,
            legacy_probe,
            known_ids: Mutex::new(known_ids),
        }
    }

    pub fn legacy_probe_enabled(&self) -> bool {
        self.legacy_probe
    }

    /// Remember a customer id so the legacy probe tries it first.
    pub fn remember(&self, id: CustomerId) {
        let snapshot = {
            let mut ids = self.known_ids.lock().unwrap_or_else(|p| p.into_inner());
            if ids.contains(&id) {
                return;
            }
            ids.push(id);
            ids.clone()
        };
        debug!("Remembered customer id {}", id);
        if let Err(e) = self.store.save_known_ids(&snapshot) {
            warn!("Could not persist known customer ids: {}", e);
        }
    }

    pub fn known_ids(&self) -> Vec<CustomerId> {
        self.known_ids.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub async fn resolve(&self, email: &str, password: &str) -> BankResult<Customer> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(BankError::Validation("Email and password are required".to_string()));
        }

        let direct = self.lookup_by_email(email, password).await;
        match direct {
            Ok(customer) => Ok(customer),
            Err(e) if self.legacy_probe => {
                warn!("Email lookup failed ({}); falling back to legacy id probe", e);
                LegacyIdProbe::new(self.known_ids())
                    .run(self.backend.as_ref(), email, password)
                    .await
            }
            Err(e) if e.is_not_found() => Err(BankError::AuthenticationFailed),
            Err(e) => Err(e),
        }
    }

    async fn lookup_by_email(&self, email: &str, password: &str) -> BankResult<Customer> {
        let dto = self.backend.customer_by_email(email).await?;
        if !dto.password_matches(password) {
            debug!("Password mismatch for {}", email);
            return Err(BankError::AuthenticationFailed);
        }
        let customer = dto.into_customer(email);
        info!("Authenticated customer {:?} by email", customer.id);
        Ok(customer)
    }
}
