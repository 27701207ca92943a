// Client module
pub mod api_client;
#[cfg(test)]
pub(crate) mod fake;

pub use api_client::ApiClient;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::account::{
    Account, AccountNo, AmountRequest, Customer, CustomerDto, CustomerId, NewAccountRequest,
    Registration, Transaction,
};
use crate::error::BankResult;

/// REST surface of the banking backend.
///
/// Every call is a single request; nothing here retries.
#[async_trait]
pub trait BankBackend: Send + Sync {
    async fn accounts_by_customer(&self, customer_id: CustomerId) -> BankResult<Vec<Account>>;

    async fn account(&self, account_no: AccountNo) -> BankResult<Account>;

    async fn balance(&self, account_no: AccountNo) -> BankResult<Decimal>;

    async fn deposit(&self, account_no: AccountNo, request: &AmountRequest) -> BankResult<Account>;

    async fn withdraw(&self, account_no: AccountNo, request: &AmountRequest) -> BankResult<Account>;

    async fn create_account(
        &self,
        customer_id: CustomerId,
        request: &NewAccountRequest,
    ) -> BankResult<Account>;

    async fn account_transactions(&self, account_no: AccountNo) -> BankResult<Vec<Transaction>>;

    async fn customer_transactions(&self, customer_id: CustomerId) -> BankResult<Vec<Transaction>>;

    async fn customer_by_id(&self, customer_id: CustomerId) -> BankResult<CustomerDto>;

    async fn customer_by_email(&self, email: &str) -> BankResult<CustomerDto>;

    async fn create_customer(&self, registration: &Registration) -> BankResult<Customer>;
}
