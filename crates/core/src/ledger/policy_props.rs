//! Property tests for the reserve policy.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::policy::{DebitCheck, check_debit};

/// Strategy for non-negative balances with two decimal places.
fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for strictly positive amounts with two decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// An allowed debit always leaves at least the reserve, and the new
    /// balance is exactly the old balance minus the amount.
    #[test]
    fn prop_allowed_debit_respects_reserve(
        balance in balance_strategy(),
        amount in amount_strategy(),
        reserve in balance_strategy(),
    ) {
        if let DebitCheck::Allowed { new_balance } = check_debit(balance, amount, reserve) {
            prop_assert!(new_balance >= reserve);
            prop_assert_eq!(new_balance, balance - amount);
        }
    }

    /// A rejected debit reports the balance unchanged and the would-be
    /// balance below the reserve.
    #[test]
    fn prop_rejected_debit_is_a_noop(
        balance in balance_strategy(),
        amount in amount_strategy(),
        reserve in balance_strategy(),
    ) {
        if let DebitCheck::Rejected { balance: reported, would_be } =
            check_debit(balance, amount, reserve)
        {
            prop_assert_eq!(reported, balance);
            prop_assert!(would_be < reserve);
            prop_assert_eq!(would_be, balance - amount);
        }
    }

    /// The check is exhaustive: every (balance, amount, reserve) triple is
    /// either allowed or rejected, decided solely by the reserve line.
    #[test]
    fn prop_check_is_total_and_consistent(
        balance in balance_strategy(),
        amount in amount_strategy(),
        reserve in balance_strategy(),
    ) {
        let allowed = matches!(
            check_debit(balance, amount, reserve),
            DebitCheck::Allowed { .. }
        );
        prop_assert_eq!(allowed, balance - amount >= reserve);
    }

    /// Balance conservation over a sequence of deposits and allowed
    /// withdrawals: final = initial + sum(deposits) - sum(withdrawals).
    #[test]
    fn prop_balance_conservation(
        initial in balance_strategy(),
        ops in prop::collection::vec((any::<bool>(), amount_strategy()), 0..50),
        reserve in balance_strategy(),
    ) {
        let mut balance = initial;
        let mut deposited = Decimal::ZERO;
        let mut withdrawn = Decimal::ZERO;

        for (is_deposit, amount) in ops {
            if is_deposit {
                balance += amount;
                deposited += amount;
            } else if let DebitCheck::Allowed { new_balance } =
                check_debit(balance, amount, reserve)
            {
                balance = new_balance;
                withdrawn += amount;
            }
            // Rejected withdrawals change nothing.
        }

        prop_assert_eq!(balance, initial + deposited - withdrawn);
    }
}
