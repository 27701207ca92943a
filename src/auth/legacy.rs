//! Legacy id-probing authentication.
//!
//! Older backends expose no email lookup, so the customer is found by fetching
//! candidate ids one by one and comparing passwords. This costs one request per
//! candidate and reveals which ids exist. It only runs when
//! `auth.legacy_id_probe` is enabled.

use tracing::{debug, info, warn};

use crate::account::{Customer, CustomerId};
use crate::client::BankBackend;
use crate::error::{BankError, BankResult};

/// Sequential ids probed after the remembered ones
pub const SEQUENTIAL_RANGE: std::ops::RangeInclusive<CustomerId> = 1..=50;

/// "Round number" ids probed last
pub const ROUND_IDS: [CustomerId; 13] = [
    100, 200, 300, 400, 500, 1000, 2000, 3000, 4000, 5000, 10000, 50000, 100000,
];

pub struct LegacyIdProbe {
    candidates: Vec<CustomerId>,
}

impl LegacyIdProbe {
    pub fn new(known_ids: Vec<CustomerId>) -> Self {
        let mut candidates = Vec::with_capacity(known_ids.len() + 63);
        let ordered = known_ids
            .into_iter()
            .chain(SEQUENTIAL_RANGE)
            .chain(ROUND_IDS);
        for id in ordered {
            if !candidates.contains(&id) {
                candidates.push(id);
            }
        }
        Self { candidates }
    }

    pub fn candidates(&self) -> &[CustomerId] {
        &self.candidates
    }

    /// Stops at the first match. A DTO that carries an email must match the
    /// supplied one; otherwise only the password is compared.
    pub async fn run(
        &self,
        backend: &dyn BankBackend,
        email: &str,
        password: &str,
    ) -> BankResult<Customer> {
        warn!("Legacy id probe: up to {} customer lookups", self.candidates.len());

        for &id in &self.candidates {
            let dto = match backend.customer_by_id(id).await {
                Ok(dto) => dto,
                Err(e) => {
                    debug!("Probe id {} skipped: {}", id, e);
                    continue;
                }
            };

            if !dto.email.is_empty() && !dto.email.eq_ignore_ascii_case(email) {
                debug!("Probe id {}: email differs", id);
                continue;
            }
            if !dto.password_matches(password) {
                debug!("Probe id {}: password mismatch", id);
                continue;
            }

            let mut customer = dto.into_customer(email);
            customer.id = Some(id);
            info!("Legacy probe matched customer id {}", id);
            return Ok(customer);
        }

        Err(BankError::AuthenticationFailed)
    }
}
