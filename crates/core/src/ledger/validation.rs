//! Input validation performed before any store access.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors rejected before the store is touched.
///
/// No transaction record is written for these; they never reach the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amount must be strictly positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// Transfers require two distinct accounts.
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    /// Opening balance is below the policy minimum.
    #[error("Opening balance must be at least {minimum}")]
    BelowMinimumOpeningBalance {
        /// The policy minimum opening balance.
        minimum: Decimal,
    },
}

/// Validates that an operation amount is strictly positive.
///
/// # Errors
///
/// Returns `ValidationError::NonPositiveAmount` for zero or negative amounts.
pub fn validate_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(())
}

/// Validates transfer inputs: positive amount and distinct accounts.
///
/// # Errors
///
/// Returns an error if the amount is non-positive or the accounts match.
pub fn validate_transfer(
    sender: i64,
    receiver: i64,
    amount: Decimal,
) -> Result<(), ValidationError> {
    if sender == receiver {
        return Err(ValidationError::SameAccountTransfer);
    }
    validate_amount(amount)
}
