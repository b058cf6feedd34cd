//! Classification errors. A malformed raw event drops that event only; the
//! session continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Raw event is missing its element snapshot")]
    MissingSnapshot,

    #[error("Malformed raw event: {0}")]
    MalformedEvent(String),

    #[error("Unsupported event kind for classification: {0}")]
    UnsupportedKind(String),
}
