//! Dashboard controller
//!
//! Mirrors the session's accounts, runs deposits, withdrawals and account
//! creation, and keeps the messages the views display. Mutating operations are
//! single-flight: a second call while one is running gets `BankError::Busy`.

pub mod cache;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::account::{
    Account, AccountNo, AccountType, AmountRequest, NewAccountRequest, Transaction,
};
use crate::client::BankBackend;
use crate::config::DashboardConfig;
use crate::credit::{self, CreditInputs, CreditReport};
use crate::error::{BankError, BankResult};
use crate::observer::SubscriptionId;
use crate::session::{SessionEvent, SessionStore};

pub use cache::{sample_transactions, TransactionCache};

pub const INVALID_AMOUNT: &str = "Please enter a valid amount";
pub const INSUFFICIENT_FUNDS: &str = "Insufficient funds";
pub const DEPOSIT_FAILED: &str = "Deposit failed. Please try again.";
pub const WITHDRAW_FAILED: &str = "Withdrawal failed. Please try again.";
pub const SELECT_ACCOUNT_TYPE: &str = "Please select an account type";
pub const CREATE_FAILED: &str = "Failed to create account. Please try again.";

/// An account as shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountView {
    pub account: Account,
    pub show_history: bool,
}

#[derive(Default)]
struct ViewState {
    views: Vec<AccountView>,
    error: Option<String>,
    success: Option<String>,
    create_form_open: bool,
}

impl ViewState {
    /// Replace the views, keeping expansion flags by account number.
    fn mirror(&mut self, accounts: &[Account]) {
        let views = accounts
            .iter()
            .map(|account| {
                let show_history = account.account_no.is_some()
                    && self
                        .views
                        .iter()
                        .any(|v| v.account.account_no == account.account_no && v.show_history);
                AccountView {
                    account: account.clone(),
                    show_history,
                }
            })
            .collect();
        self.views = views;
    }

    fn view_mut(&mut self, account_no: AccountNo) -> BankResult<&mut AccountView> {
        self.views
            .iter_mut()
            .find(|v| v.account.account_no == Some(account_no))
            .ok_or(BankError::UnknownAccount(account_no))
    }
}

/// Holds an in-flight flag until dropped, including when the owning future is
/// cancelled.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> BankResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BankError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone, Copy)]
enum Movement {
    Deposit,
    Withdraw,
}

impl Movement {
    fn failure_message(self) -> &'static str {
        match self {
            Movement::Deposit => DEPOSIT_FAILED,
            Movement::Withdraw => WITHDRAW_FAILED,
        }
    }
}

pub struct Dashboard {
    session: Arc<SessionStore>,
    backend: Arc<dyn BankBackend>,
    modal_close_delay: Duration,
    state: Arc<Mutex<ViewState>>,
    cache: TransactionCache,
    processing: AtomicBool,
    creating_account: AtomicBool,
    subscription: SubscriptionId,
}

fn lock_views(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(|p| p.into_inner())
}

impl Dashboard {
    pub fn new(
        session: Arc<SessionStore>,
        backend: Arc<dyn BankBackend>,
        config: &DashboardConfig,
    ) -> Self {
        let state = Arc::new(Mutex::new(ViewState::default()));
        lock_views(&state).mirror(&session.current_accounts());

        let mirror_state = state.clone();
        let subscription = session.subscribe(move |event| {
            if let SessionEvent::AccountsChanged(accounts) = event {
                lock_views(&mirror_state).mirror(accounts);
            }
        });

        Self {
            session,
            backend,
            modal_close_delay: config.modal_close_delay(),
            state,
            cache: TransactionCache::new(),
            processing: AtomicBool::new(false),
            creating_account: AtomicBool::new(false),
            subscription,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn accounts(&self) -> Vec<AccountView> {
        self.lock().views.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn success(&self) -> Option<String> {
        self.lock().success.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn is_creating_account(&self) -> bool {
        self.creating_account.load(Ordering::Acquire)
    }

    pub fn is_create_form_open(&self) -> bool {
        self.lock().create_form_open
    }

    pub fn open_create_form(&self) {
        let mut state = self.lock();
        state.create_form_open = true;
        state.error = None;
        state.success = None;
    }

    pub fn close_create_form(&self) {
        self.lock().create_form_open = false;
    }

    /// Flip the history flag. Expanding loads the account's transactions;
    /// collapsing returns nothing and keeps the cache.
    pub async fn toggle_history(&self, account_no: AccountNo) -> BankResult<Vec<Transaction>> {
        let expanded = {
            let mut state = self.lock();
            let view = state.view_mut(account_no)?;
            view.show_history = !view.show_history;
            view.show_history
        };
        debug!("History for account {} expanded: {}", account_no, expanded);

        if !expanded {
            return Ok(Vec::new());
        }
        Ok(self.load_history(account_no).await)
    }

    pub fn transactions_for(&self, account_no: AccountNo) -> Vec<Transaction> {
        self.cache.get(account_no)
    }

    /// Fetch history for one account. An empty or failed fetch is replaced by
    /// sample rows so the list is never blank.
    async fn load_history(&self, account_no: AccountNo) -> Vec<Transaction> {
        let transactions = match self.backend.account_transactions(account_no).await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                info!("No transactions for account {}; showing samples", account_no);
                self.samples_for(account_no)
            }
            Err(e) => {
                warn!("Loading transactions for account {} failed: {}", account_no, e);
                self.samples_for(account_no)
            }
        };
        self.cache.store(account_no, transactions.clone());
        transactions
    }

    fn samples_for(&self, account_no: AccountNo) -> Vec<Transaction> {
        let balance = self
            .lock()
            .view_mut(account_no)
            .map(|v| v.account.balance)
            .unwrap_or(Decimal::ZERO);
        sample_transactions(account_no, balance, Utc::now())
    }

    pub async fn deposit(&self, account_no: AccountNo, amount: Decimal) -> BankResult<Account> {
        self.move_funds(Movement::Deposit, account_no, amount).await
    }

    pub async fn withdraw(&self, account_no: AccountNo, amount: Decimal) -> BankResult<Account> {
        self.move_funds(Movement::Withdraw, account_no, amount).await
    }

    async fn move_funds(
        &self,
        movement: Movement,
        account_no: AccountNo,
        amount: Decimal,
    ) -> BankResult<Account> {
        let _in_flight = InFlight::acquire(&self.processing)?;

        let (available, expanded) = {
            let mut state = self.lock();
            state.error = None;
            state.success = None;
            if amount <= Decimal::ZERO {
                state.error = Some(INVALID_AMOUNT.to_string());
                return Err(BankError::Validation(INVALID_AMOUNT.to_string()));
            }
            let view = state.view_mut(account_no)?;
            (view.account.balance, view.show_history)
        };

        if let Movement::Withdraw = movement {
            if amount > available {
                self.lock().error = Some(INSUFFICIENT_FUNDS.to_string());
                return Err(BankError::InsufficientFunds {
                    requested: amount,
                    available,
                });
            }
        }

        let request = AmountRequest::today(amount);
        let result = match movement {
            Movement::Deposit => self.backend.deposit(account_no, &request).await,
            Movement::Withdraw => self.backend.withdraw(account_no, &request).await,
        };

        let updated = match result {
            Ok(account) => account,
            Err(e) => {
                warn!("Movement on account {} failed: {}", account_no, e);
                self.lock().error = Some(movement.failure_message().to_string());
                return Err(e);
            }
        };

        {
            let mut state = self.lock();
            if let Ok(view) = state.view_mut(account_no) {
                view.account.balance = updated.balance;
            }
        }
        info!("Account {} balance now {}", account_no, updated.balance);

        if let Err(e) = self.session.refresh_accounts().await {
            warn!("Refreshing accounts after movement failed: {}", e);
        }
        if expanded {
            self.load_history(account_no).await;
        }
        Ok(updated)
    }

    pub async fn create_account(
        &self,
        account_type: Option<AccountType>,
        initial_deposit: Option<Decimal>,
    ) -> BankResult<Account> {
        let customer_id = self.session.current_user().and_then(|u| u.id);
        let (Some(account_type), Some(customer_id)) = (account_type, customer_id) else {
            self.lock().error = Some(SELECT_ACCOUNT_TYPE.to_string());
            return Err(BankError::Validation(SELECT_ACCOUNT_TYPE.to_string()));
        };
        let balance = initial_deposit.unwrap_or(Decimal::ZERO);
        if balance < Decimal::ZERO {
            self.lock().error = Some(INVALID_AMOUNT.to_string());
            return Err(BankError::Validation(INVALID_AMOUNT.to_string()));
        }

        let _in_flight = InFlight::acquire(&self.creating_account)?;
        {
            let mut state = self.lock();
            state.error = None;
            state.success = None;
        }

        let request = NewAccountRequest {
            account_type,
            balance,
        };
        let account = match self.backend.create_account(customer_id, &request).await {
            Ok(account) => account,
            Err(e) => {
                warn!("Creating {} account failed: {}", account_type, e);
                let message = match &e {
                    BankError::Backend { message, .. } if !message.trim().is_empty() => {
                        message.clone()
                    }
                    _ => CREATE_FAILED.to_string(),
                };
                self.lock().error = Some(message);
                return Err(e);
            }
        };

        info!("Created {} for customer {}", account.label(), customer_id);
        self.lock().success = Some(format!("{} account created successfully!", account_type));

        if let Err(e) = self.session.refresh_accounts().await {
            warn!("Refreshing accounts after creation failed: {}", e);
        }
        self.schedule_form_close();
        Ok(account)
    }

    fn schedule_form_close(&self) {
        let state = self.state.clone();
        let delay = self.modal_close_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = lock_views(&state);
            state.create_form_open = false;
            state.success = None;
        });
    }

    /// Demo score over the current accounts. `None` without a user or accounts.
    pub fn check_credit_score(&self) -> Option<CreditReport> {
        self.check_credit_score_with(&mut rand::thread_rng())
    }

    pub fn check_credit_score_with<R: Rng>(&self, rng: &mut R) -> Option<CreditReport> {
        let user = self.session.current_user()?;
        let (total_balance, account_count) = {
            let state = self.lock();
            let total = state.views.iter().map(|v| v.account.balance).sum::<Decimal>();
            (total, state.views.len())
        };
        if account_count == 0 {
            return None;
        }

        let inputs = CreditInputs {
            customer_id: user.id,
            total_balance,
            account_count,
            transaction_count: self.cache.total_count(),
        };
        Some(credit::report(&inputs, rng))
    }

    pub fn logout(&self) {
        self.session.logout();
        self.cache.clear();
        let mut state = self.lock();
        state.error = None;
        state.success = None;
        state.create_form_open = false;
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        lock_views(&self.state)
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.session.unsubscribe(self.subscription);
    }
}
