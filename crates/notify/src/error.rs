//! Notification Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A notification error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured webhook URL cannot be used.
    #[display("invalid webhook URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The request never got a response (DNS, TLS, connection).
    #[display("webhook request failed: {_0}")]
    Request(#[error(not(source))] String),
    /// The webhook answered with a non-success status.
    #[display("webhook rejected the message with status {_0}")]
    Rejected(#[error(not(source))] u16),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidUrl(_) => false,
            Self::Request(_) => true,
            Self::Rejected(status) => *status == 429 || *status >= 500,
        }
    }
}
