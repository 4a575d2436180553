//! Integration tests for the ledger engine over an in-memory database.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use corebank_core::alert::AlertMessage;
use corebank_core::ledger::{
    INSUFFICIENT_BALANCE, LedgerPolicy, TransferOutcome, WithdrawOutcome,
};
use corebank_db::alert::AlertTransport;
use corebank_db::entities::transactions::TransactionType;
use corebank_db::migration::{Migrator, MigratorTrait};
use corebank_db::repositories::{
    AccountError, AccountRepository, CreateAccountInput, LedgerEngine, LedgerError,
    OpenAccountRequest, TransactionFilter,
};
use corebank_shared::email::EmailError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Captures dispatched alerts instead of sending email.
#[derive(Default)]
struct CaptureTransport {
    sent: Mutex<Vec<(String, AlertMessage)>>,
}

#[async_trait::async_trait]
impl AlertTransport for CaptureTransport {
    async fn send(&self, recipient: &str, message: &AlertMessage) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.clone()));
        Ok(())
    }
}

impl CaptureTransport {
    fn sent(&self) -> Vec<(String, AlertMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

/// A single-connection in-memory database keeps all queries on the same
/// `SQLite` instance.
async fn setup() -> (DatabaseConnection, AccountRepository) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await.expect("connect");
    Migrator::up(&db, None).await.expect("migrate");
    let accounts = AccountRepository::new(db.clone());
    (db, accounts)
}

fn engine(db: &DatabaseConnection) -> (LedgerEngine, Arc<CaptureTransport>) {
    let transport = Arc::new(CaptureTransport::default());
    let engine = LedgerEngine::new(db.clone(), LedgerPolicy::default(), transport.clone());
    (engine, transport)
}

async fn open(accounts: &AccountRepository, name: &str, email: &str, balance: Decimal) -> i64 {
    accounts
        .create(CreateAccountInput {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            initial_balance: balance,
        })
        .await
        .expect("create account")
        .account_no
}

#[tokio::test]
async fn test_deposit_credits_and_records() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;

    let receipt = engine.deposit(no, dec!(250)).await.unwrap();
    assert_eq!(receipt.balance, dec!(750));
    assert_eq!(accounts.get(no).await.unwrap().balance, dec!(750));

    let history = engine.history(no).await.unwrap();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(record.id, receipt.transaction_id);
    assert_eq!(record.sender_account, None);
    assert_eq!(record.receiver_account, Some(no));
    assert_eq!(record.transaction_type, TransactionType::Deposit);
    assert_eq!(record.message, "Deposit successful");
}

#[tokio::test]
async fn test_deposit_to_missing_account_leaves_no_record() {
    let (db, _) = setup().await;
    let (engine, _) = engine(&db);

    let err = engine.deposit(999, dec!(50)).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(999)));

    let all = engine.transactions(TransactionFilter::default()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_non_positive_amounts_are_rejected() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;

    assert!(matches!(
        engine.deposit(no, dec!(0)).await.unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(matches!(
        engine.withdraw(no, dec!(-5)).await.unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(engine.history(no).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_withdrawal_above_reserve_applies() {
    let (db, accounts) = setup().await;
    let (engine, transport) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;

    let outcome = engine.withdraw(no, dec!(300)).await.unwrap();
    let WithdrawOutcome::Applied(receipt) = outcome else {
        panic!("expected applied withdrawal, got {outcome:?}");
    };
    assert_eq!(receipt.balance, dec!(200));
    assert_eq!(accounts.get(no).await.unwrap().balance, dec!(200));
    assert!(transport.sent().is_empty());

    let history = engine.history(no).await.unwrap();
    assert_eq!(history[0].message, "Withdrawal successful");
    assert_eq!(history[0].sender_account, Some(no));
    assert_eq!(history[0].receiver_account, None);
}

#[tokio::test]
async fn test_withdrawal_to_exact_reserve_is_allowed() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(300)).await;

    let outcome = engine.withdraw(no, dec!(200)).await.unwrap();
    assert!(matches!(
        outcome,
        WithdrawOutcome::Applied(receipt) if receipt.balance == dec!(100)
    ));
}

#[tokio::test]
async fn test_withdrawal_breaching_reserve_is_rejected_and_recorded() {
    let (db, accounts) = setup().await;
    let (engine, transport) = engine(&db);
    let no = open(&accounts, "Ravi", "ravi@example.com", dec!(200)).await;

    let outcome = engine.withdraw(no, dec!(150)).await.unwrap();
    let WithdrawOutcome::Rejected {
        transaction_id,
        balance,
        reserve,
    } = outcome
    else {
        panic!("expected rejected withdrawal, got {outcome:?}");
    };
    assert_eq!(balance, dec!(200));
    assert_eq!(reserve, dec!(100));
    assert_eq!(accounts.get(no).await.unwrap().balance, dec!(200));

    let history = engine.history(no).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, transaction_id);
    assert_eq!(history[0].message, INSUFFICIENT_BALANCE);
    assert_eq!(history[0].transaction_type, TransactionType::Withdraw);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "ravi@example.com");
    assert!(sent[0].1.subject.contains("Declined"));
}

#[tokio::test]
async fn test_withdrawal_from_missing_account_errors() {
    let (db, _) = setup().await;
    let (engine, _) = engine(&db);

    let err = engine.withdraw(42, dec!(10)).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(42)));
}

#[tokio::test]
async fn test_transfer_moves_funds_atomically() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let sender = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;
    let receiver = open(&accounts, "Ravi", "ravi@example.com", dec!(300)).await;

    let outcome = engine.transfer(sender, receiver, dec!(150)).await.unwrap();
    let TransferOutcome::Applied { sender_balance, .. } = outcome else {
        panic!("expected applied transfer, got {outcome:?}");
    };
    assert_eq!(sender_balance, dec!(350));
    assert_eq!(accounts.get(sender).await.unwrap().balance, dec!(350));
    assert_eq!(accounts.get(receiver).await.unwrap().balance, dec!(450));

    // One record, visible from both sides.
    let sender_history = engine.history(sender).await.unwrap();
    let receiver_history = engine.history(receiver).await.unwrap();
    assert_eq!(sender_history.len(), 1);
    assert_eq!(receiver_history.len(), 1);
    assert_eq!(sender_history[0].id, receiver_history[0].id);
    assert_eq!(sender_history[0].transaction_type, TransactionType::Transfer);
    assert_eq!(sender_history[0].message, "Transfer successful");
}

#[tokio::test]
async fn test_transfer_breaching_reserve_changes_nothing() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let sender = open(&accounts, "Asha", "asha@example.com", dec!(200)).await;
    let receiver = open(&accounts, "Ravi", "ravi@example.com", dec!(300)).await;

    let outcome = engine.transfer(sender, receiver, dec!(150)).await.unwrap();
    assert!(matches!(
        outcome,
        TransferOutcome::Rejected { sender_balance, .. } if sender_balance == dec!(200)
    ));
    assert_eq!(accounts.get(sender).await.unwrap().balance, dec!(200));
    assert_eq!(accounts.get(receiver).await.unwrap().balance, dec!(300));

    let history = engine.history(sender).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, INSUFFICIENT_BALANCE);
    assert_eq!(history[0].sender_account, Some(sender));
    assert_eq!(history[0].receiver_account, Some(receiver));
}

#[tokio::test]
async fn test_transfer_to_missing_receiver_rolls_back_debit() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let sender = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;

    let err = engine.transfer(sender, 999, dec!(150)).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(999)));
    assert_eq!(accounts.get(sender).await.unwrap().balance, dec!(500));
    assert!(engine.history(sender).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transfer_to_same_account_is_rejected() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;

    let err = engine.transfer(no, no, dec!(50)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(accounts.get(no).await.unwrap().balance, dec!(500));
}

#[tokio::test]
async fn test_history_includes_rejections_newest_first() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(300)).await;

    engine.deposit(no, dec!(100)).await.unwrap();
    engine.withdraw(no, dec!(250)).await.unwrap();
    // 150 - 100 would breach the reserve.
    engine.withdraw(no, dec!(100)).await.unwrap();

    let history = engine.history(no).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|pair| pair[0].id > pair[1].id));
    assert_eq!(history[0].message, INSUFFICIENT_BALANCE);
    assert_eq!(history[1].message, "Withdrawal successful");
    assert_eq!(history[2].message, "Deposit successful");
}

#[tokio::test]
async fn test_query_by_time_range_has_inclusive_bounds() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;

    engine.deposit(no, dec!(10)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    engine.deposit(no, dec!(20)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    engine.deposit(no, dec!(30)).await.unwrap();

    let history = engine.history(no).await.unwrap();
    let (newest, middle, oldest) = (&history[0], &history[1], &history[2]);
    let boundary = middle.created_at.with_timezone(&Utc);

    // A record sitting exactly on the bound is included, from either side.
    let from_boundary = engine
        .transactions(TransactionFilter {
            account_no: Some(no),
            date_from: Some(boundary),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<i64> = from_boundary.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id]);

    let up_to_boundary = engine
        .transactions(TransactionFilter {
            account_no: Some(no),
            date_to: Some(boundary),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<i64> = up_to_boundary.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![middle.id, oldest.id]);

    let exactly_boundary = engine
        .transactions(TransactionFilter {
            account_no: Some(no),
            date_from: Some(boundary),
            date_to: Some(boundary),
        })
        .await
        .unwrap();
    assert_eq!(exactly_boundary.len(), 1);
    assert_eq!(exactly_boundary[0].id, middle.id);
}

#[tokio::test]
async fn test_debit_of_deleted_account_reports_not_found() {
    let (db, accounts) = setup().await;
    let (engine, transport) = engine(&db);
    let no = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;
    let other = open(&accounts, "Ravi", "ravi@example.com", dec!(500)).await;
    accounts.delete(no).await.unwrap();

    // A conditional debit matching zero rows must resolve to the missing
    // account, not a reserve rejection.
    let err = engine.withdraw(no, dec!(50)).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(n) if n == no));

    let err = engine.transfer(no, other, dec!(50)).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(n) if n == no));

    assert!(engine.history(no).await.unwrap().is_empty());
    assert!(transport.sent().is_empty());
    assert_eq!(accounts.get(other).await.unwrap().balance, dec!(500));
}

#[tokio::test]
async fn test_history_is_scoped_to_the_account() {
    let (db, accounts) = setup().await;
    let (engine, _) = engine(&db);
    let a = open(&accounts, "Asha", "asha@example.com", dec!(500)).await;
    let b = open(&accounts, "Ravi", "ravi@example.com", dec!(500)).await;

    engine.deposit(a, dec!(100)).await.unwrap();
    engine.deposit(b, dec!(100)).await.unwrap();

    let history = engine.history(a).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].receiver_account, Some(a));
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let (_, accounts) = setup().await;
    open(&accounts, "Asha", "asha@example.com", dec!(500)).await;

    let err = accounts
        .create(CreateAccountInput {
            name: "Imposter".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            initial_balance: dec!(500),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::DuplicateEmail(email) if email == "asha@example.com"));
}

#[tokio::test]
async fn test_open_account_hashes_password_and_enforces_minimum() {
    let (_, accounts) = setup().await;
    let policy = LedgerPolicy::default();

    let err = accounts
        .open(
            OpenAccountRequest {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                password: "swordfish".to_string(),
                initial_balance: dec!(50),
            },
            &policy,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));

    let account = accounts
        .open(
            OpenAccountRequest {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                password: "swordfish".to_string(),
                initial_balance: dec!(500),
            },
            &policy,
        )
        .await
        .unwrap();
    assert_eq!(account.balance, dec!(500));
    assert!(account.password.starts_with("$argon2id$"));
    assert!(corebank_core::auth::verify_password("swordfish", &account.password).unwrap());
}

#[tokio::test]
async fn test_below_threshold_scan() {
    let (_, accounts) = setup().await;
    let low = open(&accounts, "Asha", "asha@example.com", dec!(150)).await;
    open(&accounts, "Ravi", "ravi@example.com", dec!(500)).await;

    let flagged = accounts.below_threshold(dec!(200)).await.unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].account_no, low);
}
