//! Reminder error types.

use tempo_core::TaskId;
use tempo_store::StoreError;
use thiserror::Error;

/// Errors from reminder operations.
#[derive(Debug, Error)]
pub enum ReminderError {
    /// The referenced task does not exist or belongs to another user.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The request carried an unusable value.
    #[error("invalid reminder request: {0}")]
    Validation(String),

    /// Persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for reminder results.
pub type Result<T> = std::result::Result<T, ReminderError>;
