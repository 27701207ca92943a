//! Client session: the logged-in customer and their accounts.
//!
//! State is hydrated from the local store on open, written back on every
//! change, and pushed to subscribers.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::account::{Account, Customer};
use crate::auth::CredentialResolver;
use crate::client::BankBackend;
use crate::error::BankResult;
use crate::observer::{SubscriptionId, Subscribers};
use crate::storage::{LocalStore, USER_ACCOUNTS_KEY};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    UserChanged(Option<Customer>),
    AccountsChanged(Vec<Account>),
}

#[derive(Default)]
struct SessionState {
    user: Option<Customer>,
    accounts: Vec<Account>,
}

pub struct SessionStore {
    backend: Arc<dyn BankBackend>,
    store: LocalStore,
    resolver: Arc<CredentialResolver>,
    state: Mutex<SessionState>,
    subscribers: Subscribers<SessionEvent>,
}

impl SessionStore {
    /// Restore the last persisted snapshot. A corrupt snapshot is logged and
    /// treated as logged out.
    pub fn open(
        backend: Arc<dyn BankBackend>,
        store: LocalStore,
        resolver: Arc<CredentialResolver>,
    ) -> Self {
        let user = store.load_user().unwrap_or_else(|e| {
            warn!("Discarding unreadable user snapshot: {}", e);
            None
        });
        let accounts = if user.is_some() {
            store.load_accounts().unwrap_or_else(|e| {
                warn!("Discarding unreadable accounts snapshot: {}", e);
                Vec::new()
            })
        } else {
            Vec::new()
        };
        if let Some(u) = &user {
            info!("Restored session for {} ({} accounts)", u.email, accounts.len());
        }

        Self {
            backend,
            store,
            resolver,
            state: Mutex::new(SessionState { user, accounts }),
            subscribers: Subscribers::new(),
        }
    }

    pub fn resolver(&self) -> &Arc<CredentialResolver> {
        &self.resolver
    }

    /// Authenticate and load the customer's accounts. Any failure yields
    /// `None`; the cause is logged.
    pub async fn login(&self, email: &str, password: &str) -> Option<Customer> {
        let customer = match self.resolver.resolve(email, password).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Login failed for {}: {}", email.trim(), e);
                return None;
            }
        };

        if let Err(e) = self.store.save_user(&customer) {
            error!("Failed to persist user snapshot: {}", e);
        }
        let switched = {
            let mut state = self.lock();
            let switched = state.user.as_ref().map_or(false, |prev| {
                prev.id != customer.id || !prev.email.eq_ignore_ascii_case(&customer.email)
            });
            state.user = Some(customer.clone());
            if switched {
                state.accounts.clear();
            }
            switched
        };
        self.subscribers.publish(&SessionEvent::UserChanged(Some(customer.clone())));
        info!("Logged in as {}", customer.email);

        // The previous customer's accounts must not survive a failed load
        if switched {
            if let Err(e) = self.store.remove(USER_ACCOUNTS_KEY) {
                error!("Failed to clear accounts snapshot: {}", e);
            }
            self.subscribers.publish(&SessionEvent::AccountsChanged(Vec::new()));
        }

        if let Err(e) = self.refresh_accounts().await {
            warn!("Failed to load accounts after login: {}", e);
        }
        Some(customer)
    }

    pub fn logout(&self) {
        if let Err(e) = self.store.clear_session() {
            error!("Failed to clear session snapshot: {}", e);
        }
        {
            let mut state = self.lock();
            state.user = None;
            state.accounts.clear();
        }
        self.subscribers.publish(&SessionEvent::UserChanged(None));
        self.subscribers.publish(&SessionEvent::AccountsChanged(Vec::new()));
        info!("Logged out");
    }

    pub fn current_user(&self) -> Option<Customer> {
        self.lock().user.clone()
    }

    pub fn current_accounts(&self) -> Vec<Account> {
        self.lock().accounts.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.lock().user.is_some()
    }

    pub fn primary_account(&self) -> Option<Account> {
        self.lock().accounts.first().cloned()
    }

    /// Reload the current customer's accounts from the backend. Logged out, or
    /// a user without an id, is a no-op.
    pub async fn refresh_accounts(&self) -> BankResult<Vec<Account>> {
        let Some(customer_id) = self.current_user().and_then(|u| u.id) else {
            return Ok(Vec::new());
        };

        let accounts = self.backend.accounts_by_customer(customer_id).await?;

        // The user may have logged out while the request was in flight
        if self.current_user().and_then(|u| u.id) != Some(customer_id) {
            warn!("Dropping accounts for customer {}: session changed", customer_id);
            return Ok(Vec::new());
        }

        if let Err(e) = self.store.save_accounts(&accounts) {
            error!("Failed to persist accounts snapshot: {}", e);
        }
        self.lock().accounts = accounts.clone();
        self.subscribers.publish(&SessionEvent::AccountsChanged(accounts.clone()));
        Ok(accounts)
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::client::fake::FakeBackend;
    use rust_decimal::Decimal;

    fn session_with(backend: Arc<FakeBackend>, store: LocalStore) -> SessionStore {
        let resolver = Arc::new(CredentialResolver::new(backend.clone(), store.clone(), false));
        SessionStore::open(backend, store, resolver)
    }

    fn seeded() -> Arc<FakeBackend> {
        let backend = Arc::new(FakeBackend::new());
        let id = backend.add_customer("Asha", "asha@example.com", "pass123");
        backend.add_account(id, AccountType::Savings, Decimal::from(1500));
        backend.add_account(id, AccountType::Checking, Decimal::from(200));
        backend
    }

    #[tokio::test]
    async fn test_login_loads_accounts() {
        let session = session_with(seeded(), LocalStore::temporary().unwrap());

        let user = session.login("asha@example.com", "pass123").await.unwrap();
        assert_eq!(user.first_name, "Asha");
        assert!(session.is_logged_in());
        assert_eq!(session.current_accounts().len(), 2);
        assert_eq!(
            session.primary_account().unwrap().account_type,
            AccountType::Savings
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_none() {
        let session = session_with(seeded(), LocalStore::temporary().unwrap());
        assert!(session.login("asha@example.com", "bad").await.is_none());
        assert!(!session.is_logged_in());
        assert!(session.current_accounts().is_empty());
    }

    #[tokio::test]
    async fn test_reload_restores_and_logout_clears() {
        let backend = seeded();
        let store = LocalStore::temporary().unwrap();

        let session = session_with(backend.clone(), store.clone());
        session.login("asha@example.com", "pass123").await.unwrap();

        // "page reload"
        let reloaded = session_with(backend.clone(), store.clone());
        assert_eq!(reloaded.current_user().unwrap().email, "asha@example.com");
        assert_eq!(reloaded.current_accounts().len(), 2);

        reloaded.logout();
        assert!(reloaded.current_user().is_none());
        assert!(reloaded.current_accounts().is_empty());

        let after_logout = session_with(backend, store);
        assert!(!after_logout.is_logged_in());
        assert!(after_logout.current_accounts().is_empty());
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let session = session_with(seeded(), LocalStore::temporary().unwrap());
        let log = Arc::new(Mutex::new(Vec::new()));

        let l1 = log.clone();
        session.subscribe(move |e| {
            let tag = match e {
                SessionEvent::UserChanged(u) => format!("user:{}", u.is_some()),
                SessionEvent::AccountsChanged(a) => format!("accounts:{}", a.len()),
            };
            l1.lock().unwrap().push(tag);
        });

        session.login("asha@example.com", "pass123").await.unwrap();
        session.logout();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["user:true", "accounts:2", "user:false", "accounts:0"]
        );
    }

    #[tokio::test]
    async fn test_switching_user_drops_previous_accounts() {
        let backend = seeded();
        let bo = backend.add_customer("Bo", "bo@example.com", "pass456");
        backend.add_account(bo, AccountType::Checking, Decimal::from(90));
        let store = LocalStore::temporary().unwrap();
        let session = session_with(backend.clone(), store.clone());
        let log = Arc::new(Mutex::new(Vec::new()));
        let l1 = log.clone();
        session.subscribe(move |e| {
            if let SessionEvent::AccountsChanged(a) = e {
                l1.lock().unwrap().push(a.len());
            }
        });

        session.login("asha@example.com", "pass123").await.unwrap();
        assert_eq!(session.current_accounts().len(), 2);

        backend.fail_account_listing(bo);
        let user = session.login("bo@example.com", "pass456").await.unwrap();
        assert_eq!(user.id, Some(bo));
        assert!(session.current_accounts().is_empty());
        assert!(store.load_accounts().unwrap().is_empty());
        assert_eq!(*log.lock().unwrap(), vec![2, 0]);

        // a reload sees Bo with no stale accounts
        let reloaded = session_with(backend, store);
        assert_eq!(reloaded.current_user().unwrap().id, Some(bo));
        assert!(reloaded.current_accounts().is_empty());
    }

    #[tokio::test]
    async fn test_same_user_login_keeps_accounts_on_failed_load() {
        let backend = seeded();
        let session = session_with(backend.clone(), LocalStore::temporary().unwrap());
        session.login("asha@example.com", "pass123").await.unwrap();

        backend.fail_account_listing(1);
        session.login("asha@example.com", "pass123").await.unwrap();
        assert_eq!(session.current_accounts().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_when_logged_out_is_noop() {
        let backend = seeded();
        let session = session_with(backend.clone(), LocalStore::temporary().unwrap());
        assert!(session.refresh_accounts().await.unwrap().is_empty());
        assert_eq!(backend.call_count("accounts_by_customer"), 0);
    }
}
