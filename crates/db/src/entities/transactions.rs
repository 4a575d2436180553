//! `SeaORM` Entity for the transactions table.

use corebank_core::ledger::TransactionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An append-only transaction record.
///
/// Rows are never updated or deleted once inserted; rejected attempts are
/// recorded alongside committed mutations.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Auto-assigned, monotonic, never reused.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Debited account; absent for deposits.
    pub sender_account: Option<i64>,
    /// Credited account; absent for withdrawals.
    pub receiver_account: Option<i64>,
    /// Positive quantity moved (or attempted).
    pub amount: Decimal,
    /// Kind of balance-affecting event.
    pub transaction_type: TransactionType,
    /// Outcome note, e.g. "Withdrawal successful" or "Insufficient balance".
    pub message: String,
    /// Append timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Stored transaction type, string-backed for backend portability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionType {
    /// Credit with no sender account.
    #[sea_orm(string_value = "DEPOSIT")]
    Deposit,
    /// Debit with no receiver account.
    #[sea_orm(string_value = "WITHDRAW")]
    Withdraw,
    /// Two-account atomic move.
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Deposit => Self::Deposit,
            TransactionKind::Withdraw => Self::Withdraw,
            TransactionKind::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionType> for TransactionKind {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Deposit => Self::Deposit,
            TransactionType::Withdraw => Self::Withdraw,
            TransactionType::Transfer => Self::Transfer,
        }
    }
}

/// No entity relations; account references are plain columns.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
