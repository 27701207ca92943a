//! In-memory backend used by unit tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Mutex;
use std::time::Duration;

use super::BankBackend;
use crate::account::{
    Account, AccountNo, AccountType, AmountRequest, Customer, CustomerDto, CustomerId,
    NewAccountRequest, Registration, Transaction, TransactionOrigin, TransactionType,
};
use crate::error::{BankError, BankResult};

#[derive(Default)]
struct State {
    customers: Vec<CustomerDto>,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    calls: Vec<String>,
    next_customer_id: CustomerId,
    next_account_no: AccountNo,
    failing_account_lists: Vec<CustomerId>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    /// Behave as if `GET /customers/email/{email}` did not exist
    pub email_lookup_missing: bool,
    /// Every mutating call fails with a 500
    pub fail_mutations: bool,
    /// Only account creation fails with a 500
    pub fail_account_creation: bool,
    /// Account transaction listing fails with a 500
    pub fail_transactions: bool,
    /// Created customers come back without an id
    pub omit_created_id: bool,
    pub delay: Option<Duration>,
}

fn not_found(what: &str) -> BankError {
    BankError::Backend {
        status: 404,
        message: format!("{} not found", what),
    }
}

fn server_error() -> BankError {
    BankError::Backend {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.next_customer_id = 1;
            state.next_account_no = 1001;
        }
        backend
    }

    pub fn add_customer(&self, first: &str, email: &str, password: &str) -> CustomerId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_customer_id;
        state.next_customer_id += 1;
        state.customers.push(CustomerDto {
            id: Some(id),
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            email: email.to_string(),
            phone: "9876543210".to_string(),
            address: "221B Baker Street".to_string(),
            password: password.to_string(),
            account_ids: vec![],
        });
        id
    }

    /// Jump the id sequence, e.g. to place a customer at a "round" id.
    pub fn set_next_customer_id(&self, id: CustomerId) {
        self.state.lock().unwrap().next_customer_id = id;
    }

    pub fn add_account(
        &self,
        customer_id: CustomerId,
        kind: AccountType,
        balance: Decimal,
    ) -> AccountNo {
        let mut state = self.state.lock().unwrap();
        let no = state.next_account_no;
        state.next_account_no += 1;
        state.accounts.push(Account {
            account_type: kind,
            customer_name: "Fake Tester".to_string(),
            customer_id,
            balance,
            transaction_ids: vec![],
            account_no: Some(no),
        });
        if let Some(c) = state.customers.iter_mut().find(|c| c.id == Some(customer_id)) {
            c.account_ids.push(no);
        }
        no
    }

    pub fn add_transaction(
        &self,
        account_no: AccountNo,
        kind: TransactionType,
        amount: Decimal,
        balance: Decimal,
    ) {
        self.state.lock().unwrap().transactions.push(Transaction {
            transaction_type: kind,
            amount,
            transaction_date: "2025-01-05T10:30:00Z".to_string(),
            account_no,
            balance,
            origin: TransactionOrigin::Backend,
        });
    }

    /// Account listing for this customer fails with a 500 from now on.
    pub fn fail_account_listing(&self, customer_id: CustomerId) {
        self.state.lock().unwrap().failing_account_lists.push(customer_id);
    }

    pub fn balance_of(&self, account_no: AccountNo) -> Option<Decimal> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .iter()
            .find(|a| a.account_no == Some(account_no))
            .map(|a| a.balance)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn apply(
        &self,
        account_no: AccountNo,
        request: &AmountRequest,
        kind: TransactionType,
    ) -> BankResult<Account> {
        if self.fail_mutations {
            return Err(server_error());
        }
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.account_no == Some(account_no))
            .ok_or_else(|| not_found("Account"))?;
        match kind {
            TransactionType::Deposit => account.balance += request.amount,
            TransactionType::Withdrawal => {
                if account.balance < request.amount {
                    return Err(BankError::Backend {
                        status: 400,
                        message: "Insufficient balance".to_string(),
                    });
                }
                account.balance -= request.amount;
            }
        }
        let updated = account.clone();
        state.transactions.push(Transaction {
            transaction_type: kind,
            amount: request.amount,
            transaction_date: request.date.clone(),
            account_no,
            balance: updated.balance,
            origin: TransactionOrigin::Backend,
        });
        Ok(updated)
    }
}

#[async_trait]
impl BankBackend for FakeBackend {
    async fn accounts_by_customer(&self, customer_id: CustomerId) -> BankResult<Vec<Account>> {
        self.record(format!("accounts_by_customer:{}", customer_id));
        self.pause().await;
        let state = self.state.lock().unwrap();
        if state.failing_account_lists.contains(&customer_id) {
            return Err(server_error());
        }
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn account(&self, account_no: AccountNo) -> BankResult<Account> {
        self.record(format!("account:{}", account_no));
        let state = self.state.lock().unwrap();
        state
            .accounts
            .iter()
            .find(|a| a.account_no == Some(account_no))
            .cloned()
            .ok_or_else(|| not_found("Account"))
    }

    async fn balance(&self, account_no: AccountNo) -> BankResult<Decimal> {
        self.record(format!("balance:{}", account_no));
        self.balance_of(account_no).ok_or_else(|| not_found("Account"))
    }

    async fn deposit(&self, account_no: AccountNo, request: &AmountRequest) -> BankResult<Account> {
        self.record(format!("deposit:{}", account_no));
        self.pause().await;
        self.apply(account_no, request, TransactionType::Deposit)
    }

    async fn withdraw(
        &self,
        account_no: AccountNo,
        request: &AmountRequest,
    ) -> BankResult<Account> {
        self.record(format!("withdraw:{}", account_no));
        self.pause().await;
        self.apply(account_no, request, TransactionType::Withdrawal)
    }

    async fn create_account(
        &self,
        customer_id: CustomerId,
        request: &NewAccountRequest,
    ) -> BankResult<Account> {
        self.record(format!("create_account:{}", customer_id));
        self.pause().await;
        if self.fail_mutations || self.fail_account_creation {
            return Err(server_error());
        }
        let no = self.add_account(customer_id, request.account_type, request.balance);
        self.account(no).await
    }

    async fn account_transactions(&self, account_no: AccountNo) -> BankResult<Vec<Transaction>> {
        self.record(format!("account_transactions:{}", account_no));
        if self.fail_transactions {
            return Err(server_error());
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.account_no == account_no)
            .cloned()
            .collect())
    }

    async fn customer_transactions(
        &self,
        customer_id: CustomerId,
    ) -> BankResult<Vec<Transaction>> {
        self.record(format!("customer_transactions:{}", customer_id));
        let state = self.state.lock().unwrap();
        let owned: Vec<AccountNo> = state
            .accounts
            .iter()
            .filter(|a| a.customer_id == customer_id)
            .filter_map(|a| a.account_no)
            .collect();
        Ok(state
            .transactions
            .iter()
            .filter(|t| owned.contains(&t.account_no))
            .cloned()
            .collect())
    }

    async fn customer_by_id(&self, customer_id: CustomerId) -> BankResult<CustomerDto> {
        self.record(format!("customer_by_id:{}", customer_id));
        let state = self.state.lock().unwrap();
        state
            .customers
            .iter()
            .find(|c| c.id == Some(customer_id))
            .cloned()
            .ok_or_else(|| not_found("Customer"))
    }

    async fn customer_by_email(&self, email: &str) -> BankResult<CustomerDto> {
        self.record(format!("customer_by_email:{}", email));
        if self.email_lookup_missing {
            return Err(not_found("Endpoint"));
        }
        let state = self.state.lock().unwrap();
        state
            .customers
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| not_found("Customer"))
    }

    async fn create_customer(&self, registration: &Registration) -> BankResult<Customer> {
        self.record(format!("create_customer:{}", registration.email));
        self.pause().await;
        if self.fail_mutations {
            return Err(server_error());
        }
        let duplicate = {
            let state = self.state.lock().unwrap();
            state.customers.iter().any(|c| c.email == registration.email)
        };
        if duplicate {
            return Err(BankError::Backend {
                status: 400,
                message: "Email already registered".to_string(),
            });
        }
        let id = self.add_customer(
            &registration.first_name,
            &registration.email,
            &registration.password,
        );
        let dto = self.customer_by_id(id).await?;
        let mut customer = dto.into_customer(&registration.email);
        customer.last_name = registration.last_name.clone();
        if self.omit_created_id {
            customer.id = None;
        }
        Ok(customer)
    }
}
