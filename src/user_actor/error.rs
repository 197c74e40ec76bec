use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::auth::AuthError;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for UserError {
    fn from(error: FrameworkError) -> Self {
        match error {
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
