//! Background low-balance alert notifier.
//!
//! A periodic sweep scans for accounts below the low-balance threshold and
//! dispatches notifications through an [`AlertTransport`]. Delivery failures
//! are logged and never affect account state; a suppression window keeps a
//! persistently low account from being re-notified every sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use corebank_core::alert::{AlertMessage, low_balance_alert, needs_alert};
use corebank_core::ledger::LedgerPolicy;
use corebank_shared::config::AlertConfig;
use corebank_shared::email::{EmailError, EmailService};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::repositories::AccountRepository;

/// Delivery channel for alert messages.
///
/// The notifier and the ledger engine are written against this trait so
/// tests can capture dispatched alerts without an SMTP server.
#[async_trait]
pub trait AlertTransport: Send + Sync {
    /// Delivers one message to one recipient.
    async fn send(&self, recipient: &str, message: &AlertMessage) -> Result<(), EmailError>;
}

/// SMTP-backed alert transport.
#[derive(Clone)]
pub struct EmailAlertTransport {
    email: EmailService,
}

impl EmailAlertTransport {
    /// Creates a transport over the given email service.
    #[must_use]
    pub const fn new(email: EmailService) -> Self {
        Self { email }
    }
}

#[async_trait]
impl AlertTransport for EmailAlertTransport {
    async fn send(&self, recipient: &str, message: &AlertMessage) -> Result<(), EmailError> {
        self.email
            .send_email(recipient, &message.subject, &message.body)
            .await
    }
}

/// Periodic low-balance sweeper.
pub struct AlertNotifier {
    accounts: AccountRepository,
    transport: Arc<dyn AlertTransport>,
    policy: LedgerPolicy,
    sweep_interval: Duration,
    suppress_repeat: Duration,
    last_alerted: HashMap<i64, Instant>,
}

impl AlertNotifier {
    /// Creates a notifier from the alert configuration.
    #[must_use]
    pub fn new(
        accounts: AccountRepository,
        transport: Arc<dyn AlertTransport>,
        policy: LedgerPolicy,
        config: &AlertConfig,
    ) -> Self {
        Self {
            accounts,
            transport,
            policy,
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            suppress_repeat: Duration::from_secs(config.suppress_repeat_secs),
            last_alerted: HashMap::new(),
        }
    }

    /// Runs one sweep, returning how many alerts were dispatched.
    ///
    /// Accounts whose balance has recovered drop out of the suppression
    /// map, so falling below the threshold again triggers a fresh alert
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns an error only if the account scan itself fails; individual
    /// delivery failures are logged and skipped.
    pub async fn sweep(&mut self) -> Result<usize, sea_orm::DbErr> {
        let low = self
            .accounts
            .below_threshold(self.policy.low_balance_threshold)
            .await?;

        let still_low: std::collections::HashSet<i64> =
            low.iter().map(|account| account.account_no).collect();
        self.last_alerted
            .retain(|account_no, _| still_low.contains(account_no));

        let mut sent = 0;
        for account in low {
            if !needs_alert(
                account.balance,
                &account.email,
                self.policy.low_balance_threshold,
            ) {
                warn!(
                    account_no = account.account_no,
                    "Low balance but no contact address; alert skipped"
                );
                continue;
            }

            if let Some(last) = self.last_alerted.get(&account.account_no) {
                if last.elapsed() < self.suppress_repeat {
                    debug!(
                        account_no = account.account_no,
                        "Alert suppressed within repeat window"
                    );
                    continue;
                }
            }

            let message = low_balance_alert(&account.name, account.balance, self.policy.reserve);
            match self.transport.send(&account.email, &message).await {
                Ok(()) => {
                    self.last_alerted.insert(account.account_no, Instant::now());
                    sent += 1;
                    info!(account_no = account.account_no, "Low-balance alert sent");
                }
                Err(err) => {
                    warn!(
                        account_no = account.account_no,
                        error = %err,
                        "Low-balance alert failed"
                    );
                }
            }
        }

        Ok(sent)
    }

    /// Runs the sweep loop until the stop signal fires.
    ///
    /// An in-flight sweep always completes before the loop exits.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        // First sweep after one full interval, not at startup.
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.sweep_interval,
            self.sweep_interval,
        );
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(interval_secs = self.sweep_interval.as_secs(), "Alert notifier started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep().await {
                        Ok(sent) if sent > 0 => debug!(sent, "Alert sweep completed"),
                        Ok(_) => {}
                        Err(err) => warn!(error = %err, "Alert sweep failed"),
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        info!("Alert notifier stopping");
                        break;
                    }
                }
            }
        }
    }
}
