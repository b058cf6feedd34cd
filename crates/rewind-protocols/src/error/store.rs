//! Session store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store query failed: {0}")]
    Query(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session is finalized, no further appends: {0}")]
    SessionClosed(String),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
