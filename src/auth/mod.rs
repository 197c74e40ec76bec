//! Credential handling behind small traits so the directory never depends on
//! a concrete hashing or token scheme.

mod password;
mod token;

pub use password::*;
pub use token::*;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Token issuance failed: {0}")]
    Token(String),
}
