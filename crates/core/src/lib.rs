//! Core business logic for Corebank.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, policy rules, and validation live here.
//!
//! # Modules
//!
//! - `ledger` - Balance mutation rules: reserve policy, validation, outcomes
//! - `alert` - Low-balance alert qualification and message composition
//! - `auth` - Password hashing for the account-creation flow

pub mod alert;
pub mod auth;
pub mod ledger;
