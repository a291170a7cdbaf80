//! Configuration Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    MissingFile(#[error(not(source))] PathBuf),
    /// The file extension does not name a supported format.
    #[display("unsupported configuration format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// The merged configuration does not describe a valid setup.
    #[display("invalid configuration")]
    Invalid,
    /// A required setting has no value in any layer.
    #[display("missing setting: {_0}")]
    MissingSetting(#[error(not(source))] &'static str),
    /// The secret could not be fetched.
    #[display("could not fetch secret '{_0}'")]
    SecretUnavailable(#[error(not(source))] String),
    /// The secret exists but is not a JSON object of strings.
    #[display("secret '{_0}' is not a JSON object of strings")]
    InvalidSecret(#[error(not(source))] String),
    /// The secret does not contain the expected key.
    #[display("secret '{secret}' has no key '{key}'")]
    MissingSecretKey { secret: String, key: String },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SecretUnavailable(_))
    }
}
