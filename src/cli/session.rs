use super::Context;
use crate::error::{BankError, BankResult};
use crate::signup::SignupForm;

pub async fn handle_login(ctx: &Context, email: &str, password: &str) -> BankResult<()> {
    match ctx.session.login(email, password).await {
        Some(customer) => {
            println!("Welcome, {}!", customer.full_name());
            super::ops::print_accounts(&ctx.session.current_accounts());
            Ok(())
        }
        None => Err(BankError::AuthenticationFailed),
    }
}

pub fn handle_logout(ctx: &Context) -> BankResult<()> {
    if !ctx.session.is_logged_in() {
        println!("Not logged in.");
        return Ok(());
    }
    ctx.session.logout();
    println!("Logged out.");
    Ok(())
}

pub fn handle_whoami(ctx: &Context) -> BankResult<()> {
    let customer = ctx.session.current_user().ok_or(BankError::NotLoggedIn)?;
    println!("{} <{}>", customer.full_name(), customer.email);
    if let Some(id) = customer.id {
        println!("Customer ID: {}", id);
    }
    if !customer.phone.is_empty() {
        println!("Phone: {}", customer.phone);
    }
    println!("Accounts: {}", ctx.session.current_accounts().len());
    Ok(())
}

pub async fn handle_signup(ctx: &Context, form: &SignupForm) -> BankResult<()> {
    let signup = ctx.signup();
    match signup.submit(form).await {
        Ok(outcome) => {
            println!("{}", outcome.message());
            Ok(())
        }
        Err(e) => {
            if let Some(message) = signup.error() {
                println!("{}", message);
            }
            Err(e)
        }
    }
}
