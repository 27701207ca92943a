use rust_decimal::Decimal;
use tracing::warn;

use super::Context;
use crate::account::{Account, AccountNo, AccountType, Transaction};
use crate::dashboard::{AccountView, Dashboard};
use crate::error::{BankError, BankResult};

pub fn print_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts yet.");
        return;
    }
    for account in accounts {
        println!("  {:<28} balance: {}", account.label(), account.balance);
    }
}

pub fn print_views(views: &[AccountView]) {
    let accounts: Vec<Account> = views.iter().map(|v| v.account.clone()).collect();
    print_accounts(&accounts);
}

pub fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("  No transactions.");
        return;
    }
    for tx in transactions {
        println!("  {}", tx);
    }
    if transactions.iter().any(Transaction::is_sample) {
        println!("  (sample data, no transactions recorded yet)");
    }
}

fn logged_in_dashboard(ctx: &Context) -> BankResult<Dashboard> {
    if !ctx.session.is_logged_in() {
        return Err(BankError::NotLoggedIn);
    }
    Ok(ctx.dashboard())
}

/// Surface the dashboard's message for a failed operation.
fn report_failure(dashboard: &Dashboard, err: BankError) -> BankError {
    match dashboard.error() {
        Some(message) => println!("{}", message),
        None => println!("{}", err.user_message()),
    }
    err
}

pub async fn handle_accounts(ctx: &Context) -> BankResult<()> {
    if !ctx.session.is_logged_in() {
        return Err(BankError::NotLoggedIn);
    }
    let accounts = match ctx.session.refresh_accounts().await {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!("Refresh failed, showing cached accounts: {}", e);
            ctx.session.current_accounts()
        }
    };
    print_accounts(&accounts);
    Ok(())
}

pub async fn handle_deposit(ctx: &Context, account: AccountNo, amount: Decimal) -> BankResult<()> {
    let dashboard = logged_in_dashboard(ctx)?;
    match dashboard.deposit(account, amount).await {
        Ok(updated) => {
            println!("Deposited {}. New balance: {}", amount, updated.balance);
            Ok(())
        }
        Err(e) => Err(report_failure(&dashboard, e)),
    }
}

pub async fn handle_withdraw(ctx: &Context, account: AccountNo, amount: Decimal) -> BankResult<()> {
    let dashboard = logged_in_dashboard(ctx)?;
    match dashboard.withdraw(account, amount).await {
        Ok(updated) => {
            println!("Withdrew {}. New balance: {}", amount, updated.balance);
            Ok(())
        }
        Err(e) => Err(report_failure(&dashboard, e)),
    }
}

pub async fn handle_history(ctx: &Context, account: AccountNo) -> BankResult<()> {
    let dashboard = logged_in_dashboard(ctx)?;
    let transactions = dashboard.toggle_history(account).await?;
    println!("History for account #{}:", account);
    print_transactions(&transactions);
    Ok(())
}

pub async fn handle_open_account(
    ctx: &Context,
    account_type: AccountType,
    initial_deposit: Option<Decimal>,
) -> BankResult<()> {
    let dashboard = logged_in_dashboard(ctx)?;
    match dashboard.create_account(Some(account_type), initial_deposit).await {
        Ok(account) => {
            if let Some(message) = dashboard.success() {
                println!("{}", message);
            }
            println!("  {}", account.label());
            Ok(())
        }
        Err(e) => Err(report_failure(&dashboard, e)),
    }
}

pub fn handle_credit_score(ctx: &Context) -> BankResult<()> {
    let dashboard = logged_in_dashboard(ctx)?;
    match dashboard.check_credit_score() {
        Some(report) => println!("{}", report),
        None => println!("Open an account to see a credit score."),
    }
    Ok(())
}
