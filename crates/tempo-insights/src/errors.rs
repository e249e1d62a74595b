//! Error types for the insights crate.

use thiserror::Error;

/// Errors from metric, streak, and dashboard operations.
#[derive(Debug, Error)]
pub enum InsightsError {
    /// Underlying storage failure.
    #[error("store error: {0}")]
    Store(#[from] tempo_store::StoreError),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, InsightsError>;
