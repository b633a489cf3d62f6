//! Error types for synckit.

use thiserror::Error;

use crate::store::AuthorizationStatus;

/// Errors that can occur while fetching from or applying to a store.
///
/// The reconciliation functions themselves never fail; these errors come from
/// the collaborators that produce their inputs and consume their outputs.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Access to the external store is not granted (status: {0})")]
    Authorization(AuthorizationStatus),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found in store: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}

/// Result type alias for synckit operations.
pub type SyncResult<T> = Result<T, SyncError>;
