//! Password hashing for the account-creation flow.
//!
//! Accounts store an Argon2id hash, never the plaintext. Interactive login
//! is handled by an external caller; it only needs `verify_password`.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
