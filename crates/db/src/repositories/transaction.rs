//! Transaction log repository: the append-only record of ledger activity.
//!
//! Every balance-affecting attempt, including rejected ones, is appended
//! here. Rows are never updated or deleted; history queries read straight
//! from the durable log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::transactions::{self, TransactionType};

/// A record to append to the log.
#[derive(Debug, Clone)]
pub struct NewTransactionRecord {
    /// Debited account; `None` for deposits.
    pub sender_account: Option<i64>,
    /// Credited account; `None` for withdrawals.
    pub receiver_account: Option<i64>,
    /// Positive quantity moved (or attempted).
    pub amount: Decimal,
    /// Kind of event being recorded.
    pub transaction_type: TransactionType,
    /// Outcome note.
    pub message: String,
}

/// Filter for querying the log.
///
/// All fields are optional; an empty filter returns the full history.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to records where this account is sender or receiver.
    pub account_no: Option<i64>,
    /// Inclusive lower bound on the append timestamp.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the append timestamp.
    pub date_to: Option<DateTime<Utc>>,
}

/// Transaction log repository.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    db: DatabaseConnection,
}

impl TransactionLog {
    /// Creates a new transaction log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a record inside the caller's transaction.
    ///
    /// Taking a generic connection lets the ledger engine append within the
    /// same database transaction as the balance update it describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn append<C: ConnectionTrait>(
        &self,
        conn: &C,
        record: NewTransactionRecord,
    ) -> Result<i64, DbErr> {
        let row = transactions::ActiveModel {
            sender_account: Set(record.sender_account),
            receiver_account: Set(record.receiver_account),
            amount: Set(record.amount),
            transaction_type: Set(record.transaction_type),
            message: Set(record.message),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let inserted = row.insert(conn).await?;
        Ok(inserted.id)
    }

    /// Queries the log, newest first.
    ///
    /// Records with equal timestamps fall back to descending id so the
    /// ordering is total.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn query(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<transactions::Model>, DbErr> {
        let mut select = transactions::Entity::find();

        if let Some(account_no) = filter.account_no {
            select = select.filter(
                Condition::any()
                    .add(transactions::Column::SenderAccount.eq(account_no))
                    .add(transactions::Column::ReceiverAccount.eq(account_no)),
            );
        }
        if let Some(from) = filter.date_from {
            select = select.filter(transactions::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.date_to {
            select = select.filter(transactions::Column::CreatedAt.lte(to));
        }

        select
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await
    }

    /// Full history for one account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(&self, account_no: i64) -> Result<Vec<transactions::Model>, DbErr> {
        self.query(TransactionFilter {
            account_no: Some(account_no),
            ..Default::default()
        })
        .await
    }
}
