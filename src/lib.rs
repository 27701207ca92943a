pub mod account;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod credit;
pub mod dashboard;
pub mod error;
pub mod interactive;
pub mod observer;
pub mod session;
pub mod signup;
pub mod storage;
