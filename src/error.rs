//! Error types for RelateScore.
//!
//! Library code returns [`RelateError`]; the binary wraps it in `anyhow`.

use thiserror::Error;

/// Errors raised by thread bookkeeping and the thread store.
///
/// Scoring and aggregation are total and never produce these.
#[derive(Debug, Error)]
pub enum RelateError {
    #[error("Thread not found: {code}")]
    ThreadNotFound { code: String },

    #[error("Thread {code} needs consent from both parties (currently {consenting})")]
    ConsentRequired { code: String, consenting: usize },

    #[error("Thread {code} was withdrawn; create a new invite code")]
    ThreadWithdrawn { code: String },

    #[error("Effort rating must be between 1 and 5 (got {0})")]
    InvalidEffort(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, RelateError>;
