// Centralized error types for the user store

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`crate::stores::user_store::UserStore`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("User already exists: {0}")]
    DuplicateUser(Uuid),
}
