//! Reserve policy and debit checks.
//!
//! Every debit must leave at least the reserve in the account. The check is
//! written as a pure function so the store can evaluate the same rule inside
//! its conditional update and the engine can classify the result.

use rust_decimal::Decimal;

use super::validation::ValidationError;

/// Policy amounts governing ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    /// Minimum balance that must remain after any debit.
    pub reserve: Decimal,
    /// Balance below which low-balance alerts are sent (above the reserve).
    pub low_balance_threshold: Decimal,
    /// Minimum balance required to open an account.
    pub min_opening_balance: Decimal,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            reserve: Decimal::from(100),
            low_balance_threshold: Decimal::from(200),
            min_opening_balance: Decimal::from(100),
        }
    }
}

/// Outcome of checking a debit against the reserve policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitCheck {
    /// The debit keeps the balance at or above the reserve.
    Allowed {
        /// Balance after the debit is applied.
        new_balance: Decimal,
    },
    /// The debit would breach the reserve and must be rejected.
    Rejected {
        /// Balance at the time of the check (unchanged by the rejection).
        balance: Decimal,
        /// Balance the debit would have produced.
        would_be: Decimal,
    },
}

/// Checks whether debiting `amount` from `balance` respects the reserve.
#[must_use]
pub fn check_debit(balance: Decimal, amount: Decimal, reserve: Decimal) -> DebitCheck {
    let would_be = balance - amount;
    if would_be >= reserve {
        DebitCheck::Allowed {
            new_balance: would_be,
        }
    } else {
        DebitCheck::Rejected { balance, would_be }
    }
}

/// Validates the opening balance for a new account.
///
/// Enforced by the account-creation flow before the store is invoked; the
/// minimum is a policy constant distinct from the reserve.
///
/// # Errors
///
/// Returns `ValidationError::BelowMinimumOpeningBalance` if the balance is
/// below the policy minimum.
pub fn validate_opening_balance(
    balance: Decimal,
    policy: &LedgerPolicy,
) -> Result<(), ValidationError> {
    if balance < policy.min_opening_balance {
        return Err(ValidationError::BelowMinimumOpeningBalance {
            minimum: policy.min_opening_balance,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_within_reserve_is_allowed() {
        let check = check_debit(dec!(500), dec!(300), dec!(100));
        assert_eq!(
            check,
            DebitCheck::Allowed {
                new_balance: dec!(200)
            }
        );
    }

    #[test]
    fn test_debit_breaching_reserve_is_rejected() {
        // 500 - 450 = 50 would land below the reserve line.
        let check = check_debit(dec!(500), dec!(450), dec!(100));
        assert_eq!(
            check,
            DebitCheck::Rejected {
                balance: dec!(500),
                would_be: dec!(50)
            }
        );
    }

    #[test]
    fn test_debit_to_exactly_reserve_is_allowed() {
        let check = check_debit(dec!(500), dec!(400), dec!(100));
        assert_eq!(
            check,
            DebitCheck::Allowed {
                new_balance: dec!(100)
            }
        );
    }

    #[test]
    fn test_opening_balance_at_minimum() {
        let policy = LedgerPolicy::default();
        assert!(validate_opening_balance(dec!(100), &policy).is_ok());
    }

    #[test]
    fn test_opening_balance_below_minimum() {
        let policy = LedgerPolicy::default();
        assert!(matches!(
            validate_opening_balance(dec!(99), &policy),
            Err(ValidationError::BelowMinimumOpeningBalance { .. })
        ));
    }

    #[test]
    fn test_default_policy_ordering() {
        let policy = LedgerPolicy::default();
        assert!(policy.low_balance_threshold > policy.reserve);
    }
}
