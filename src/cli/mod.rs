pub mod ops;
pub mod session;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;

use crate::account::{AccountNo, AccountType};
use crate::auth::CredentialResolver;
use crate::client::{ApiClient, BankBackend};
use crate::config::BankConfig;
use crate::dashboard::Dashboard;
use crate::error::BankResult;
use crate::session::SessionStore;
use crate::signup::Signup;
use crate::storage::LocalStore;

#[derive(Parser)]
#[command(name = "bankdesk")]
#[command(about = "Customer banking desk", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "bankdesk.toml")]
    pub config: PathBuf,

    /// Override `backend.base_url`
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the logged-in customer
    Whoami,
    /// Register a new customer with an initial account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        account_type: AccountType,
    },
    /// Refresh and list accounts
    Accounts,
    Deposit {
        #[arg(long)]
        account: AccountNo,
        #[arg(long)]
        amount: Decimal,
    },
    Withdraw {
        #[arg(long)]
        account: AccountNo,
        #[arg(long)]
        amount: Decimal,
    },
    /// Transaction history of one account
    History {
        #[arg(long)]
        account: AccountNo,
    },
    /// Open another account for the logged-in customer
    OpenAccount {
        #[arg(long)]
        account_type: AccountType,
        #[arg(long)]
        initial_deposit: Option<Decimal>,
    },
    /// Demo credit score
    CreditScore,
}

/// Everything a command needs, wired from the config.
pub struct Context {
    pub config: BankConfig,
    pub backend: Arc<dyn BankBackend>,
    pub resolver: Arc<CredentialResolver>,
    pub session: Arc<SessionStore>,
}

impl Context {
    pub fn build(config: BankConfig) -> BankResult<Self> {
        let backend: Arc<dyn BankBackend> = Arc::new(ApiClient::new(
            &config.backend.base_url,
            config.backend.timeout(),
        )?);
        let store = LocalStore::open(&config.session.data_dir)?;
        Ok(Self::with_backend(config, backend, store))
    }

    pub fn with_backend(
        config: BankConfig,
        backend: Arc<dyn BankBackend>,
        store: LocalStore,
    ) -> Self {
        let resolver = Arc::new(CredentialResolver::new(
            backend.clone(),
            store.clone(),
            config.auth.legacy_id_probe,
        ));
        let session = Arc::new(SessionStore::open(backend.clone(), store, resolver.clone()));

        Self {
            config,
            backend,
            resolver,
            session,
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.session.clone(), self.backend.clone(), &self.config.dashboard)
    }

    pub fn signup(&self) -> Signup {
        Signup::new(self.backend.clone(), self.resolver.clone())
    }
}

pub async fn dispatch(ctx: &Context, command: Commands) -> BankResult<()> {
    match command {
        Commands::Login { email, password } => session::handle_login(ctx, &email, &password).await,
        Commands::Logout => session::handle_logout(ctx),
        Commands::Whoami => session::handle_whoami(ctx),
        Commands::Signup {
            first_name,
            last_name,
            email,
            phone,
            address,
            password,
            confirm_password,
            account_type,
        } => {
            let form = crate::signup::SignupForm {
                first_name,
                last_name,
                email,
                phone,
                address,
                password,
                confirm_password,
                account_type: Some(account_type),
            };
            session::handle_signup(ctx, &form).await
        }
        Commands::Accounts => ops::handle_accounts(ctx).await,
        Commands::Deposit { account, amount } => ops::handle_deposit(ctx, account, amount).await,
        Commands::Withdraw { account, amount } => ops::handle_withdraw(ctx, account, amount).await,
        Commands::History { account } => ops::handle_history(ctx, account).await,
        Commands::OpenAccount {
            account_type,
            initial_deposit,
        } => ops::handle_open_account(ctx, account_type, initial_deposit).await,
        Commands::CreditScore => ops::handle_credit_score(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deposit() {
        let cli = Cli::parse_from([
            "bankdesk",
            "--backend-url",
            "http://127.0.0.1:9999/api",
            "deposit",
            "--account",
            "1001",
            "--amount",
            "250.75",
        ]);
        assert_eq!(cli.backend_url.as_deref(), Some("http://127.0.0.1:9999/api"));
        match cli.command {
            Some(Commands::Deposit { account, amount }) => {
                assert_eq!(account, 1001);
                assert_eq!(amount, Decimal::new(25075, 2));
            }
            _ => panic!("expected deposit"),
        }
    }

    #[test]
    fn test_parse_open_account_without_deposit() {
        let cli = Cli::parse_from(["bankdesk", "open-account", "--account-type", "business"]);
        assert_eq!(cli.config, PathBuf::from("bankdesk.toml"));
        match cli.command {
            Some(Commands::OpenAccount {
                account_type,
                initial_deposit,
            }) => {
                assert_eq!(account_type, AccountType::Business);
                assert!(initial_deposit.is_none());
            }
            _ => panic!("expected open-account"),
        }
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        let cli = Cli::parse_from(["bankdesk"]);
        assert!(cli.command.is_none());
    }
}
