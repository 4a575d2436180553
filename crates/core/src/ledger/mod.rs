//! Ledger domain rules.
//!
//! The ledger engine in `corebank-db` drives every balance mutation; the
//! rules it enforces live here, free of any database dependency:
//!
//! - `policy` - The reserve policy and debit checks
//! - `types` - Transaction kinds and operation outcomes
//! - `validation` - Input validation performed before any store access

pub mod policy;
pub mod types;
pub mod validation;

#[cfg(test)]
mod policy_props;

pub use policy::{DebitCheck, LedgerPolicy, check_debit, validate_opening_balance};
pub use types::{INSUFFICIENT_BALANCE, Receipt, TransactionKind, TransferOutcome, WithdrawOutcome};
pub use validation::{ValidationError, validate_amount, validate_transfer};
