//! Low-balance alert qualification and message composition.
//!
//! The background sweeper and the ledger engine both dispatch alerts; the
//! rules for who qualifies and what the message says live here so transport
//! concerns stay out of the domain.

use rust_decimal::Decimal;

/// A composed notification ready for an alert transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// Notification subject line.
    pub subject: String,
    /// Plain-text notification body.
    pub body: String,
}

/// Returns true if an account qualifies for a low-balance alert.
///
/// Requires a balance below the threshold and a contact address to send to.
#[must_use]
pub fn needs_alert(balance: Decimal, email: &str, threshold: Decimal) -> bool {
    balance < threshold && !email.trim().is_empty()
}

/// Composes the periodic low-balance alert.
#[must_use]
pub fn low_balance_alert(name: &str, balance: Decimal, reserve: Decimal) -> AlertMessage {
    AlertMessage {
        subject: "Low Balance Alert".to_string(),
        body: format!(
            "Dear {name},\n\n\
             Your account balance is low.\n\
             A minimum balance of {reserve} must be maintained.\n\n\
             Current Balance: {balance}\n\n\
             Regards,\n\
             Corebank"
        ),
    }
}

/// Composes the alert sent when a withdrawal is declined by the reserve rule.
#[must_use]
pub fn declined_withdrawal_alert(name: &str, balance: Decimal, reserve: Decimal) -> AlertMessage {
    AlertMessage {
        subject: "Transaction Declined - Low Balance Alert".to_string(),
        body: format!(
            "Dear {name},\n\n\
             Your withdrawal request was declined due to insufficient balance.\n\
             A minimum balance of {reserve} must be maintained.\n\n\
             Current Balance: {balance}\n\n\
             Regards,\n\
             Corebank"
        ),
    }
}
