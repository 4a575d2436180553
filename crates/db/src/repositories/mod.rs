//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod ledger;
pub mod transaction;

pub use account::{AccountError, AccountRepository, CreateAccountInput, OpenAccountRequest};
pub use ledger::{LedgerEngine, LedgerError};
pub use transaction::{NewTransactionRecord, TransactionFilter, TransactionLog};
