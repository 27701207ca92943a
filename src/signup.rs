//! Customer registration
//!
//! Creates the customer, then an initial bank account with a zero balance.
//! When the create response carries no id, the new customer is looked up
//! through the credential resolver.

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::account::{AccountType, CustomerId, NewAccountRequest, Registration};
use crate::auth::CredentialResolver;
use crate::client::BankBackend;
use crate::dashboard::InFlight;
use crate::error::{BankError, BankResult};

pub const DUPLICATE_CUSTOMER: &str =
    "Email or phone number already exists. Please use different credentials.";
pub const CREATE_CUSTOMER_FAILED: &str = "Failed to create account. Please try again.";
pub const ACCOUNT_SETUP_FAILED: &str =
    "Customer created but failed to create bank account. Please contact support.";

#[derive(Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub confirm_password: String,
    pub account_type: Option<AccountType>,
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

fn check_length(value: &str, field: &str, min: usize) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len == 0 {
        Err(format!("{} is required", field))
    } else if len < min {
        Err(format!("{} must be at least {} characters", field, min))
    } else {
        Ok(())
    }
}

impl SignupForm {
    /// First failing rule, as a message for the form.
    pub fn validate(&self) -> Result<(), String> {
        check_length(&self.first_name, "First name", 2)?;
        check_length(&self.last_name, "Last name", 2)?;
        if self.email.trim().is_empty() {
            return Err("Email is required".to_string());
        }
        if !is_valid_email(self.email.trim()) {
            return Err("Please enter a valid email".to_string());
        }
        let phone = self.phone.trim();
        if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err("Please enter a valid 10-digit phone number".to_string());
        }
        check_length(&self.address, "Address", 10)?;
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        if self.password.chars().count() < 6 {
            return Err("Password must be at least 6 characters".to_string());
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }
        if self.account_type.is_none() {
            return Err("Please select an account type".to_string());
        }
        Ok(())
    }

    fn registration(&self) -> Registration {
        Registration {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Customer and initial account exist
    Complete { customer_id: CustomerId },
    /// Customer exists; its id could not be recovered so no account was opened
    CustomerOnly,
}

impl SignupOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SignupOutcome::Complete { .. } => "Account created successfully! You can now log in.",
            SignupOutcome::CustomerOnly => {
                "Customer account created successfully! Please log in to create your bank account."
            }
        }
    }
}

#[derive(Default)]
struct Messages {
    error: Option<String>,
    success: Option<String>,
}

pub struct Signup {
    backend: Arc<dyn BankBackend>,
    resolver: Arc<CredentialResolver>,
    loading: AtomicBool,
    messages: Mutex<Messages>,
}

impl Signup {
    pub fn new(backend: Arc<dyn BankBackend>, resolver: Arc<CredentialResolver>) -> Self {
        Self {
            backend,
            resolver,
            loading: AtomicBool::new(false),
            messages: Mutex::new(Messages::default()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn success(&self) -> Option<String> {
        self.lock().success.clone()
    }

    pub async fn submit(&self, form: &SignupForm) -> BankResult<SignupOutcome> {
        if let Err(message) = form.validate() {
            self.fail(message.clone());
            return Err(BankError::Validation(message));
        }
        let account_type = form
            .account_type
            .ok_or_else(|| BankError::Validation("Please select an account type".to_string()))?;

        let loading = InFlight::acquire(&self.loading)?;
        *self.lock() = Messages::default();

        let result = self.register(form, account_type).await;
        drop(loading);

        match &result {
            Ok(outcome) => self.lock().success = Some(outcome.message().to_string()),
            Err(e) => warn!("Signup for {} failed: {}", form.email.trim(), e),
        }
        result
    }

    async fn register(
        &self,
        form: &SignupForm,
        account_type: AccountType,
    ) -> BankResult<SignupOutcome> {
        let registration = form.registration();
        let created = match self.backend.create_customer(&registration).await {
            Ok(c) => c,
            Err(e) => {
                let message = match &e {
                    BankError::Backend { status: 400, .. } => DUPLICATE_CUSTOMER.to_string(),
                    BankError::Backend { message, .. } if !message.trim().is_empty() => {
                        message.clone()
                    }
                    _ => CREATE_CUSTOMER_FAILED.to_string(),
                };
                self.fail(message);
                return Err(e);
            }
        };

        let customer_id = match created.id {
            Some(id) => id,
            None => {
                warn!("Customer created without an id; looking it up");
                match self
                    .resolver
                    .resolve(&registration.email, &registration.password)
                    .await
                {
                    Ok(found) => match found.id {
                        Some(id) => id,
                        None => return Ok(SignupOutcome::CustomerOnly),
                    },
                    Err(e) => {
                        warn!("Could not recover new customer id: {}", e);
                        return Ok(SignupOutcome::CustomerOnly);
                    }
                }
            }
        };
        self.resolver.remember(customer_id);

        let request = NewAccountRequest {
            account_type,
            balance: Decimal::ZERO,
        };
        match self.backend.create_account(customer_id, &request).await {
            Ok(account) => {
                info!("Signup complete: customer {}, {}", customer_id, account.label());
                Ok(SignupOutcome::Complete { customer_id })
            }
            Err(e) => {
                self.fail(ACCOUNT_SETUP_FAILED.to_string());
                Err(e)
            }
        }
    }

    fn fail(&self, message: String) {
        let mut messages = self.lock();
        messages.success = None;
        messages.error = Some(message);
    }

    fn lock(&self) -> MutexGuard<'_, Messages> {
        self.messages.lock().unwrap_or_else(|p| p.into_inner())
    }
}
