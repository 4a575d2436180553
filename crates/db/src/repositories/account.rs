//! Account repository: durable account records.
//!
//! Balances are only ever mutated through the ledger engine; this repository
//! provides creation, lookup, and the raw atomic balance update the engine
//! builds on.

use corebank_core::auth::{PasswordError, hash_password};
use corebank_core::ledger::{LedgerPolicy, ValidationError, validate_opening_balance};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use tracing::info;

use crate::entities::accounts;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(i64),

    /// Email is already registered to another account.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// The opening request failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Request to open a new account.
///
/// Carries the plaintext password; [`AccountRepository::open`] hashes it
/// before anything is stored.
#[derive(Debug, Clone)]
pub struct OpenAccountRequest {
    /// Holder name.
    pub name: String,
    /// Contact email; must be unique.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Opening balance; must meet the policy minimum.
    pub initial_balance: Decimal,
}

/// Input for creating an account.
///
/// The caller validates the opening balance against policy and hashes the
/// password before invoking the store.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Holder name.
    pub name: String,
    /// Contact email; must be unique.
    pub email: String,
    /// Argon2id password hash (PHC string format).
    pub password_hash: String,
    /// Opening balance.
    pub initial_balance: Decimal,
}

/// Account repository for store operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account, assigning the next account number.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateEmail` if the email is already
    /// registered, or `AccountError::Database` on other failures.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, AccountError> {
        let CreateAccountInput {
            name,
            email,
            password_hash,
            initial_balance,
        } = input;

        let account = accounts::ActiveModel {
            name: Set(name),
            password: Set(password_hash),
            email: Set(email.clone()),
            balance: Set(initial_balance),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        match account.insert(&self.db).await {
            Ok(created) => {
                info!(account_no = created.account_no, "Account created");
                Ok(created)
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(AccountError::DuplicateEmail(email))
                }
                _ => Err(err.into()),
            },
        }
    }

    /// Opens a new account: validates the opening balance against policy,
    /// hashes the password, and inserts.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` if the opening balance is below
    /// the policy minimum, `AccountError::Password` if hashing fails, and
    /// `AccountError::DuplicateEmail` if the email is taken.
    pub async fn open(
        &self,
        request: OpenAccountRequest,
        policy: &LedgerPolicy,
    ) -> Result<accounts::Model, AccountError> {
        validate_opening_balance(request.initial_balance, policy)?;
        let password_hash = hash_password(&request.password)?;

        self.create(CreateAccountInput {
            name: request.name,
            email: request.email,
            password_hash,
            initial_balance: request.initial_balance,
        })
        .await
    }

    /// Finds an account by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, account_no: i64) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(account_no).one(&self.db).await
    }

    /// Gets an account by number, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn get(&self, account_no: i64) -> Result<accounts::Model, AccountError> {
        self.find(account_no)
            .await?
            .ok_or(AccountError::NotFound(account_no))
    }

    /// Lists all accounts ordered by account number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .order_by_asc(accounts::Column::AccountNo)
            .all(&self.db)
            .await
    }

    /// Applies `balance += delta` as a single atomic update.
    ///
    /// The delta may be negative; reserve enforcement is the ledger
    /// engine's concern, not the store's.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if no row matched the account number.
    pub async fn update_balance(&self, account_no: i64, delta: Decimal) -> Result<(), AccountError> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .filter(accounts::Column::AccountNo.eq(account_no))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AccountError::NotFound(account_no));
        }
        Ok(())
    }

    /// Lists accounts with a balance strictly below `threshold`.
    ///
    /// Used by the alert sweep; a single consistent read per account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn below_threshold(
        &self,
        threshold: Decimal,
    ) -> Result<Vec<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::Balance.lt(threshold))
            .order_by_asc(accounts::Column::AccountNo)
            .all(&self.db)
            .await
    }

    /// Deletes an account (administrative operation).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn delete(&self, account_no: i64) -> Result<(), AccountError> {
        let result = accounts::Entity::delete_by_id(account_no)
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AccountError::NotFound(account_no));
        }
        info!(account_no, "Account deleted");
        Ok(())
    }

    /// Deletes all accounts, returning how many were removed.
    ///
    /// Counter reset is left to the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        let result = accounts::Entity::delete_many().exec(&self.db).await?;
        info!(deleted = result.rows_affected, "All accounts deleted");
        Ok(result.rows_affected)
    }
}
