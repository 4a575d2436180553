//! Shared configuration and email transport for Corebank.
//!
//! This crate provides the pieces every other crate needs:
//! - Configuration management (files + `COREBANK__` env overrides)
//! - SMTP email service for outbound notifications

pub mod config;
pub mod email;

pub use config::AppConfig;
pub use email::{EmailError, EmailService};
