//! Transactional ledger engine: the sole authority for balance mutation.
//!
//! Every deposit, withdrawal, and transfer runs inside a single database
//! transaction that both applies the balance change and appends the log
//! record, so no committed mutation can ever be missing its history entry.
//! Debits are expressed as conditional updates that enforce the minimum
//! reserve in the same statement that subtracts the amount; two concurrent
//! withdrawals can never both pass a stale balance check.

use std::sync::Arc;

use corebank_core::alert::{declined_withdrawal_alert, needs_alert};
use corebank_core::ledger::{
    DebitCheck, INSUFFICIENT_BALANCE, LedgerPolicy, Receipt, TransactionKind, TransferOutcome,
    ValidationError, WithdrawOutcome, check_debit, validate_amount, validate_transfer,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    TransactionTrait,
};
use tracing::{info, warn};

use crate::alert::AlertTransport;
use crate::entities::{accounts, transactions};
use crate::repositories::transaction::{NewTransactionRecord, TransactionFilter, TransactionLog};

/// Error types for ledger operations.
///
/// Business rejections (insufficient balance) are not errors; they are
/// `Rejected` outcome variants. Errors mean the request itself was invalid
/// or the system failed.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The request failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// The ledger engine.
///
/// Holds the connection pool, the reserve policy, and the alert transport
/// used for synchronous declined-withdrawal notifications.
#[derive(Clone)]
pub struct LedgerEngine {
    db: DatabaseConnection,
    log: TransactionLog,
    policy: LedgerPolicy,
    alerts: Arc<dyn AlertTransport>,
}

impl LedgerEngine {
    /// Creates a new ledger engine.
    #[must_use]
    pub fn new(db: DatabaseConnection, policy: LedgerPolicy, alerts: Arc<dyn AlertTransport>) -> Self {
        let log = TransactionLog::new(db.clone());
        Self {
            db,
            log,
            policy,
            alerts,
        }
    }

    /// Returns the policy this engine enforces.
    #[must_use]
    pub const fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    /// Deposits `amount` into an account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a non-positive amount and
    /// `LedgerError::AccountNotFound` if the account does not exist; no
    /// record is appended in either case.
    pub async fn deposit(&self, account_no: i64, amount: Decimal) -> Result<Receipt, LedgerError> {
        validate_amount(amount)?;

        let txn = self.db.begin().await?;

        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(amount),
            )
            .filter(accounts::Column::AccountNo.eq(account_no))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(LedgerError::AccountNotFound(account_no));
        }

        let balance = Self::read_balance(&txn, account_no).await?;
        let transaction_id = self
            .log
            .append(
                &txn,
                NewTransactionRecord {
                    sender_account: None,
                    receiver_account: Some(account_no),
                    amount,
                    transaction_type: TransactionKind::Deposit.into(),
                    message: TransactionKind::Deposit.success_message().to_string(),
                },
            )
            .await?;

        txn.commit().await?;
        info!(account_no, %amount, transaction_id, "Deposit applied");
        Ok(Receipt {
            transaction_id,
            balance,
        })
    }

    /// Withdraws `amount` from an account, enforcing the minimum reserve.
    ///
    /// A withdrawal that would drop the balance below the reserve is
    /// recorded as a rejected attempt and, when the account has a contact
    /// address, triggers a declined-withdrawal alert before returning.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a non-positive amount and
    /// `LedgerError::AccountNotFound` if the account does not exist.
    pub async fn withdraw(
        &self,
        account_no: i64,
        amount: Decimal,
    ) -> Result<WithdrawOutcome, LedgerError> {
        validate_amount(amount)?;

        let txn = self.db.begin().await?;

        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).sub(amount),
            )
            .filter(accounts::Column::AccountNo.eq(account_no))
            .filter(
                Expr::col(accounts::Column::Balance)
                    .sub(amount)
                    .gte(self.policy.reserve),
            )
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            // Zero rows means either the reserve blocked the debit or the
            // account no longer exists; only a read inside this transaction
            // can tell them apart.
            let Some(account) = accounts::Entity::find_by_id(account_no).one(&txn).await? else {
                txn.rollback().await?;
                return Err(LedgerError::AccountNotFound(account_no));
            };

            // Record the rejected attempt, then notify the holder outside
            // the transaction.
            let transaction_id = self
                .log
                .append(
                    &txn,
                    NewTransactionRecord {
                        sender_account: Some(account_no),
                        receiver_account: None,
                        amount,
                        transaction_type: TransactionKind::Withdraw.into(),
                        message: INSUFFICIENT_BALANCE.to_string(),
                    },
                )
                .await?;
            txn.commit().await?;

            let DebitCheck::Rejected { balance, would_be } =
                check_debit(account.balance, amount, self.policy.reserve)
            else {
                // The conditional update is the authority; a disagreeing
                // re-check means the balance moved underneath us, which the
                // rejected record already captured faithfully.
                return Ok(WithdrawOutcome::Rejected {
                    transaction_id,
                    balance: account.balance,
                    reserve: self.policy.reserve,
                });
            };

            info!(account_no, %amount, %would_be, transaction_id, "Withdrawal rejected");
            if needs_alert(would_be, &account.email, self.policy.low_balance_threshold) {
                let message =
                    declined_withdrawal_alert(&account.name, balance, self.policy.reserve);
                if let Err(err) = self.alerts.send(&account.email, &message).await {
                    warn!(account_no, error = %err, "Declined-withdrawal alert failed");
                }
            }

            return Ok(WithdrawOutcome::Rejected {
                transaction_id,
                balance,
                reserve: self.policy.reserve,
            });
        }

        let balance = Self::read_balance(&txn, account_no).await?;
        let transaction_id = self
            .log
            .append(
                &txn,
                NewTransactionRecord {
                    sender_account: Some(account_no),
                    receiver_account: None,
                    amount,
                    transaction_type: TransactionKind::Withdraw.into(),
                    message: TransactionKind::Withdraw.success_message().to_string(),
                },
            )
            .await?;

        txn.commit().await?;
        info!(account_no, %amount, transaction_id, "Withdrawal applied");
        Ok(WithdrawOutcome::Applied(Receipt {
            transaction_id,
            balance,
        }))
    }

    /// Transfers `amount` between two accounts atomically.
    ///
    /// Either both balances change and a single record is appended, or
    /// neither balance changes. The sender's debit is subject to the same
    /// reserve rule as a withdrawal.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a non-positive amount or a
    /// same-account transfer, and `LedgerError::AccountNotFound` naming
    /// whichever account is missing.
    pub async fn transfer(
        &self,
        sender: i64,
        receiver: i64,
        amount: Decimal,
    ) -> Result<TransferOutcome, LedgerError> {
        validate_transfer(sender, receiver, amount)?;

        let txn = self.db.begin().await?;

        let debit = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).sub(amount),
            )
            .filter(accounts::Column::AccountNo.eq(sender))
            .filter(
                Expr::col(accounts::Column::Balance)
                    .sub(amount)
                    .gte(self.policy.reserve),
            )
            .exec(&txn)
            .await?;

        if debit.rows_affected == 0 {
            // Zero rows means reserve breach or missing sender; a read
            // inside this transaction distinguishes the two.
            let Some(sender_account) = accounts::Entity::find_by_id(sender).one(&txn).await?
            else {
                txn.rollback().await?;
                return Err(LedgerError::AccountNotFound(sender));
            };

            let transaction_id = self
                .log
                .append(
                    &txn,
                    NewTransactionRecord {
                        sender_account: Some(sender),
                        receiver_account: Some(receiver),
                        amount,
                        transaction_type: TransactionKind::Transfer.into(),
                        message: INSUFFICIENT_BALANCE.to_string(),
                    },
                )
                .await?;
            txn.commit().await?;

            info!(sender, receiver, %amount, transaction_id, "Transfer rejected");
            return Ok(TransferOutcome::Rejected {
                transaction_id,
                sender_balance: sender_account.balance,
                reserve: self.policy.reserve,
            });
        }

        let credit = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(amount),
            )
            .filter(accounts::Column::AccountNo.eq(receiver))
            .exec(&txn)
            .await?;

        if credit.rows_affected == 0 {
            // Receiver vanished between validation and credit; undo the
            // debit by aborting the whole transaction.
            txn.rollback().await?;
            return Err(LedgerError::AccountNotFound(receiver));
        }

        let sender_balance = Self::read_balance(&txn, sender).await?;
        let transaction_id = self
            .log
            .append(
                &txn,
                NewTransactionRecord {
                    sender_account: Some(sender),
                    receiver_account: Some(receiver),
                    amount,
                    transaction_type: TransactionKind::Transfer.into(),
                    message: TransactionKind::Transfer.success_message().to_string(),
                },
            )
            .await?;

        txn.commit().await?;
        info!(sender, receiver, %amount, transaction_id, "Transfer applied");
        Ok(TransferOutcome::Applied {
            transaction_id,
            sender_balance,
        })
    }

    /// Queries the durable transaction log, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        Ok(self.log.query(filter).await?)
    }

    /// Full transaction history for one account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(&self, account_no: i64) -> Result<Vec<transactions::Model>, LedgerError> {
        Ok(self.log.history(account_no).await?)
    }

    async fn read_balance(txn: &DatabaseTransaction, account_no: i64) -> Result<Decimal, LedgerError> {
        accounts::Entity::find_by_id(account_no)
            .one(txn)
            .await?
            .map(|account| account.balance)
            .ok_or(LedgerError::AccountNotFound(account_no))
    }
}
