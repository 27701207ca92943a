// HTTP client for the banking REST backend
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::BankBackend;
use crate::account::{
    Account, AccountNo, AmountRequest, Customer, CustomerDto, CustomerId, NewAccountRequest,
    Registration, Transaction,
};
use crate::error::{BankError, BankResult};

pub struct ApiClient {
    base_url: Url,
    client: Client,
    request_id: AtomicU64,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> BankResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BankError::Config(format!("Invalid backend url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BankError::Config(format!("Backend url '{}' cannot be a base", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BankError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Join path segments onto the base url. Segments are percent-encoded,
    /// so an email address is safe to pass as-is.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> BankResult<T> {
        self.send::<T, ()>(Method::GET, segments, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> BankResult<T> {
        self.send(Method::POST, segments, Some(body)).await
    }

    // Helper for sending requests
    async fn send<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> BankResult<T> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let url = self.endpoint(segments);
        debug!("HTTP #{} {} {}", id, method, url.path());

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("HTTP #{} failed: {}", id, e);
            BankError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            debug!("HTTP #{} rejected with {}: {}", id, status, message);
            return Err(BankError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response.json::<T>().await?;
        debug!("HTTP #{} ok", id);
        Ok(parsed)
    }
}

/// Prefer the `message` field of a JSON error body, then the raw body,
/// then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status.canonical_reason().unwrap_or("Unknown error").to_string()
}

#[async_trait]
impl BankBackend for ApiClient {
    async fn accounts_by_customer(&self, customer_id: CustomerId) -> BankResult<Vec<Account>> {
        let id = customer_id.to_string();
        self.get(&["accounts", "customer", &id, "getAccounts"]).await
    }

    async fn account(&self, account_no: AccountNo) -> BankResult<Account> {
        let no = account_no.to_string();
        self.get(&["accounts", &no]).await
    }

    async fn balance(&self, account_no: AccountNo) -> BankResult<Decimal> {
        let no = account_no.to_string();
        self.get(&["accounts", &no, "balance"]).await
    }

    async fn deposit(&self, account_no: AccountNo, request: &AmountRequest) -> BankResult<Account> {
        let no = account_no.to_string();
        self.post(&["accounts", &no, "deposit"], request).await
    }

    async fn withdraw(
        &self,
        account_no: AccountNo,
        request: &AmountRequest,
    ) -> BankResult<Account> {
        let no = account_no.to_string();
        self.post(&["accounts", &no, "withdraw"], request).await
    }

    async fn create_account(
        &self,
        customer_id: CustomerId,
        request: &NewAccountRequest,
    ) -> BankResult<Account> {
        let id = customer_id.to_string();
        self.post(&["accounts", "customer", &id], request).await
    }

    async fn account_transactions(&self, account_no: AccountNo) -> BankResult<Vec<Transaction>> {
        let no = account_no.to_string();
        self.get(&["transactions", "account", &no]).await
    }

    async fn customer_transactions(&self, customer_id: CustomerId) -> BankResult<Vec<Transaction>> {
        let id = customer_id.to_string();
        self.get(&["transactions", "customer", &id]).await
    }

    async fn customer_by_id(&self, customer_id: CustomerId) -> BankResult<CustomerDto> {
        let id = customer_id.to_string();
        self.get(&["customers", &id]).await
    }

    async fn customer_by_email(&self, email: &str) -> BankResult<CustomerDto> {
        self.get(&["customers", "email", email]).await
    }

    async fn create_customer(&self, registration: &Registration) -> BankResult<Customer> {
        self.post(&["customers"], registration).await
    }
}
