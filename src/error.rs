//! Crate-wide error and degradation types.

use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Request-level failures. Each variant maps to exactly one HTTP status.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing request fields
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),

    #[error("Payload too large: {size} bytes (max {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Classification backend unreachable, timed out, or kept failing transiently
    #[error("Classification backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Classification backend answered with its own error
    #[error("Classification backend error: {0}")]
    BackendRejected(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidQueryType(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::ProductNotFound(_) => StatusCode::NOT_FOUND,
            Error::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::BackendRejected(_) | Error::Database(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand to a caller. Internal faults are redacted; the full
    /// error is only ever logged server-side.
    pub fn public_message(&self) -> String {
        match self {
            Error::Database(_) | Error::Internal(_) => "Internal server error".to_string(),
            Error::BackendUnavailable(_) => {
                "Classification backend unavailable, try again later".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Internal(_))
    }
}

/// Non-fatal problems reported inside an otherwise successful result.
///
/// The carried string is the server-side cause. It is logged, never shown to
/// callers: `Display` is the caller-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    TranslationDegraded(String),
    TranslationTimeout,
    NarrationDegraded(String),
}

impl Degradation {
    /// Underlying cause, for logs only.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Degradation::TranslationDegraded(cause) | Degradation::NarrationDegraded(cause) => {
                Some(cause)
            }
            Degradation::TranslationTimeout => None,
        }
    }
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::TranslationDegraded(_) => {
                write!(f, "TranslationDegraded: remote translation unavailable")
            }
            Degradation::TranslationTimeout => {
                write!(f, "TranslationTimeout: translation service did not answer in time")
            }
            Degradation::NarrationDegraded(_) => {
                write!(f, "NarrationDegraded: speech synthesis unavailable")
            }
        }
    }
}
