//! Transaction kinds and operation outcomes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Message recorded for attempts rejected by the reserve policy.
pub const INSUFFICIENT_BALANCE: &str = "Insufficient balance";

/// Kind of balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Credit with no sender account.
    Deposit,
    /// Debit with no receiver account.
    Withdraw,
    /// Debit of one account and credit of another, atomically.
    Transfer,
}

impl TransactionKind {
    /// Message recorded when the operation applies successfully.
    #[must_use]
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit successful",
            Self::Withdraw => "Withdrawal successful",
            Self::Transfer => "Transfer successful",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Withdraw => write!(f, "WITHDRAW"),
            Self::Transfer => write!(f, "TRANSFER"),
        }
    }
}

/// Result of a successfully applied balance mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Identifier of the appended transaction record.
    pub transaction_id: i64,
    /// Balance of the mutated account after the operation.
    pub balance: Decimal,
}

/// Outcome of a withdrawal attempt.
///
/// A rejection is an ordinary outcome, not an error: the attempt is still
/// recorded and the caller branches on it routinely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    /// The withdrawal was applied.
    Applied(Receipt),
    /// The withdrawal would breach the reserve; nothing changed.
    Rejected {
        /// Identifier of the rejected-attempt record.
        transaction_id: i64,
        /// Current (unchanged) balance.
        balance: Decimal,
        /// Reserve the debit would have breached.
        reserve: Decimal,
    },
}

/// Outcome of a transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Both legs of the transfer were applied atomically.
    Applied {
        /// Identifier of the appended transaction record.
        transaction_id: i64,
        /// Sender balance after the debit.
        sender_balance: Decimal,
    },
    /// The debit would breach the sender's reserve; neither account changed.
    Rejected {
        /// Identifier of the rejected-attempt record.
        transaction_id: i64,
        /// Current (unchanged) sender balance.
        sender_balance: Decimal,
        /// Reserve the debit would have breached.
        reserve: Decimal,
    },
}
