use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::account::{AccountNo, AccountType, CustomerId};
use crate::cli::{ops, Context};
use crate::dashboard::Dashboard;
use crate::error::BankResult;
use crate::signup::SignupForm;

fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_parsed<T: FromStr>(label: &str) -> io::Result<Option<T>> {
    match prompt(label)? {
        Some(s) => match s.parse() {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                println!("Invalid input.");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

fn print_banner() {
    println!("========================================");
    println!("               BANKDESK                 ");
    println!("========================================");
}

/// The dashboard for the logged-in customer. It lives for one login so view
/// state, the transaction cache and the form timer survive between menu rounds.
#[derive(Default)]
struct ActiveDashboard {
    current: Option<(Option<CustomerId>, Dashboard)>,
}

impl ActiveDashboard {
    /// `None` while logged out. A logout or a customer switch drops the old
    /// dashboard.
    fn get(&mut self, ctx: &Context) -> Option<&Dashboard> {
        let Some(user) = ctx.session.current_user() else {
            self.current = None;
            return None;
        };
        if self.current.as_ref().map_or(true, |(id, _)| *id != user.id) {
            self.current = Some((user.id, ctx.dashboard()));
        }
        self.current.as_ref().map(|(_, dashboard)| dashboard)
    }
}

/// Login/signup menu while logged out, dashboard menu while logged in. Ends
/// on exit or end of input.
pub async fn run(ctx: &Context) -> BankResult<()> {
    print_banner();
    let mut active = ActiveDashboard::default();
    loop {
        let keep_going = match active.get(ctx) {
            Some(dashboard) => dashboard_menu(ctx, dashboard).await?,
            None => welcome_menu(ctx).await?,
        };
        if !keep_going {
            println!("Goodbye.");
            return Ok(());
        }
    }
}

async fn welcome_menu(ctx: &Context) -> BankResult<bool> {
    println!("\n1. Login");
    println!("2. Sign up");
    println!("3. Exit");
    let Some(choice) = prompt("Select: ")? else {
        return Ok(false);
    };

    match choice.as_str() {
        "1" => {
            let Some(email) = prompt("Email: ")? else { return Ok(false) };
            let Some(password) = prompt("Password: ")? else { return Ok(false) };
            match ctx.session.login(&email, &password).await {
                Some(customer) => println!("Welcome, {}!", customer.full_name()),
                None => println!("Invalid email or password. Please try again."),
            }
        }
        "2" => {
            let Some(form) = read_signup_form()? else { return Ok(false) };
            let signup = ctx.signup();
            match signup.submit(&form).await {
                Ok(outcome) => println!("{}", outcome.message()),
                Err(e) => println!("{}", signup.error().unwrap_or_else(|| e.user_message())),
            }
        }
        "3" => return Ok(false),
        _ => println!("Invalid option."),
    }
    Ok(true)
}

fn read_signup_form() -> io::Result<Option<SignupForm>> {
    let mut form = SignupForm::default();
    let fields: [(&str, &mut String); 7] = [
        ("First name: ", &mut form.first_name),
        ("Last name: ", &mut form.last_name),
        ("Email: ", &mut form.email),
        ("Phone (10 digits): ", &mut form.phone),
        ("Address: ", &mut form.address),
        ("Password: ", &mut form.password),
        ("Confirm password: ", &mut form.confirm_password),
    ];
    for (label, slot) in fields {
        match prompt(label)? {
            Some(value) => *slot = value,
            None => return Ok(None),
        }
    }
    form.account_type = read_account_type()?;
    Ok(Some(form))
}

fn read_account_type() -> io::Result<Option<AccountType>> {
    for (i, kind) in AccountType::all().iter().enumerate() {
        println!("  {}. {}", i + 1, kind);
    }
    let choice = prompt("Account type: ")?.unwrap_or_default();
    let by_index = choice
        .parse::<usize>()
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| AccountType::all().get(i).copied());
    Ok(by_index.or_else(|| choice.parse().ok()))
}

async fn dashboard_menu(ctx: &Context, dashboard: &Dashboard) -> BankResult<bool> {
    if let Some(user) = ctx.session.current_user() {
        println!("\n--- {} ---", user.full_name());
    }
    ops::print_views(&dashboard.accounts());

    println!("\n1. Refresh accounts");
    println!("2. Deposit");
    println!("3. Withdraw");
    println!("4. Toggle transaction history");
    println!("5. Open new account");
    println!("6. Check credit score");
    println!("7. Logout");
    println!("8. Exit");
    let Some(choice) = prompt("Select: ")? else {
        return Ok(false);
    };

    match choice.as_str() {
        "1" => {
            if let Err(e) = ctx.session.refresh_accounts().await {
                println!("{}", e.user_message());
            }
        }
        "2" | "3" => {
            let Some(account) = prompt_parsed::<AccountNo>("Account number: ")? else {
                return Ok(true);
            };
            let Some(amount) = prompt_parsed::<Decimal>("Amount: ")? else {
                return Ok(true);
            };
            let result = if choice == "2" {
                dashboard.deposit(account, amount).await
            } else {
                dashboard.withdraw(account, amount).await
            };
            match result {
                Ok(updated) => println!("New balance: {}", updated.balance),
                Err(e) => print_error(dashboard, &e.user_message()),
            }
        }
        "4" => {
            let Some(account) = prompt_parsed::<AccountNo>("Account number: ")? else {
                return Ok(true);
            };
            match dashboard.toggle_history(account).await {
                Ok(transactions) => ops::print_transactions(&transactions),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        "5" => {
            dashboard.open_create_form();
            let account_type = read_account_type()?;
            let initial = prompt("Initial deposit (blank for none): ")?
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse::<Decimal>().ok());
            match dashboard.create_account(account_type, initial).await {
                Ok(_) => println!("{}", dashboard.success().unwrap_or_default()),
                Err(e) => print_error(dashboard, &e.user_message()),
            }
        }
        "6" => match dashboard.check_credit_score() {
            Some(report) => println!("{}", report),
            None => println!("Open an account to see a credit score."),
        },
        "7" => {
            dashboard.logout();
            println!("Logged out.");
        }
        "8" => return Ok(false),
        _ => println!("Invalid option."),
    }
    Ok(true)
}

fn print_error(dashboard: &Dashboard, fallback: &str) {
    println!("{}", dashboard.error().unwrap_or_else(|| fallback.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeBackend;
    use crate::config::BankConfig;
    use crate::storage::LocalStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dashboard_kept_for_one_login() {
        let backend = Arc::new(FakeBackend::new());
        let asha = backend.add_customer("Asha", "asha@example.com", "pass123");
        let no = backend.add_account(asha, AccountType::Savings, Decimal::from(800));
        let bo = backend.add_customer("Bo", "bo@example.com", "pass456");
        backend.add_account(bo, AccountType::Checking, Decimal::from(40));
        let ctx = Context::with_backend(
            BankConfig::default(),
            backend.clone(),
            LocalStore::temporary().unwrap(),
        );
        let mut active = ActiveDashboard::default();
        assert!(active.get(&ctx).is_none());

        ctx.session.login("asha@example.com", "pass123").await.unwrap();
        let rows = active.get(&ctx).unwrap().toggle_history(no).await.unwrap();
        assert_eq!(rows.len(), 3);

        // the next menu round sees the same view state and cache
        let dashboard = active.get(&ctx).unwrap();
        assert_eq!(dashboard.transactions_for(no).len(), 3);
        assert!(dashboard.toggle_history(no).await.unwrap().is_empty());
        assert_eq!(ctx.session.subscriber_count(), 1);

        ctx.session.login("bo@example.com", "pass456").await.unwrap();
        let dashboard = active.get(&ctx).unwrap();
        assert!(dashboard.transactions_for(no).is_empty());
        assert_eq!(dashboard.accounts()[0].account.customer_id, bo);
        assert_eq!(ctx.session.subscriber_count(), 1);

        dashboard.logout();
        assert!(active.get(&ctx).is_none());
        assert_eq!(ctx.session.subscriber_count(), 0);
    }
}
