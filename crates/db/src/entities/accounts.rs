//! `SeaORM` Entity for the accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A bank account row.
///
/// `account_no` is assigned by the store's monotonic counter on insert.
/// Identity attributes are immutable after creation; only `balance` changes,
/// and only through the ledger engine.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Auto-assigned account number.
    #[sea_orm(primary_key)]
    pub account_no: i64,
    /// Holder name.
    pub name: String,
    /// Argon2id hash of the holder's password (PHC string format).
    pub password: String,
    /// Contact email, unique across all accounts.
    #[sea_orm(unique)]
    pub email: String,
    /// Current balance; non-negative.
    pub balance: Decimal,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// No entity relations; transaction records reference accounts by number
/// without a back-reference.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
