//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Email (SMTP) configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Ledger policy amounts.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Low-balance alert sweeper configuration.
    #[serde(default)]
    pub alerts: AlertConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Email (SMTP) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP server hostname.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Sender email address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_name: default_from_name(),
            from_email: default_from_email(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_name() -> String {
    "Corebank".to_string()
}

fn default_from_email() -> String {
    "noreply@corebank.local".to_string()
}

/// Ledger policy amounts.
///
/// `reserve` is the minimum balance that must remain after any debit.
/// `low_balance_threshold` sits above the reserve and drives alerting.
/// `min_opening_balance` applies at account creation only.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Minimum balance that must remain after any debit.
    #[serde(default = "default_reserve")]
    pub reserve: Decimal,
    /// Balance below which low-balance alerts are sent.
    #[serde(default = "default_low_balance_threshold")]
    pub low_balance_threshold: Decimal,
    /// Minimum balance required to open an account.
    #[serde(default = "default_min_opening_balance")]
    pub min_opening_balance: Decimal,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            reserve: default_reserve(),
            low_balance_threshold: default_low_balance_threshold(),
            min_opening_balance: default_min_opening_balance(),
        }
    }
}

fn default_reserve() -> Decimal {
    Decimal::from(100)
}

fn default_low_balance_threshold() -> Decimal {
    Decimal::from(200)
}

fn default_min_opening_balance() -> Decimal {
    Decimal::from(100)
}

/// Low-balance alert sweeper configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Seconds between sweeps of the account store.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Seconds during which a re-alert for the same account is suppressed.
    #[serde(default = "default_suppress_repeat_secs")]
    pub suppress_repeat_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            suppress_repeat_secs: default_suppress_repeat_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_suppress_repeat_secs() -> u64 {
    300
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COREBANK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
    }

    #[test]
    fn test_policy_defaults() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.reserve, dec!(100));
        assert_eq!(policy.low_balance_threshold, dec!(200));
        assert_eq!(policy.min_opening_balance, dec!(100));
        assert!(policy.low_balance_threshold > policy.reserve);
    }

    #[test]
    fn test_alert_defaults() {
        let alerts = AlertConfig::default();
        assert_eq!(alerts.sweep_interval_secs, 60);
        assert_eq!(alerts.suppress_repeat_secs, 300);
    }
}
