//! Banking domain types as exchanged with the backend
//!
//! - Accounts owned by a customer
//! - Customers and the registration payload
//! - Transactions, including locally synthesized sample rows

pub mod types;
pub mod customer;
pub mod transaction;

pub use types::{Account, AccountNo, AccountType, AmountRequest, NewAccountRequest};
pub use customer::{Customer, CustomerDto, CustomerId, Registration};
pub use transaction::{Transaction, TransactionOrigin, TransactionType};
