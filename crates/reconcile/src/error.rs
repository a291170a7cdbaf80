//! Reconciliation Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Errors from the collaborator crates are kept as
//! children of these kinds.

use derive_more::{Display, Error};

/// A reconciliation error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The reconciler is set up wrong; nothing was attempted.
    #[display("invalid reconciler configuration")]
    Configuration,
    /// The storage listing failed.
    #[display("could not list metadata files")]
    Storage,
    /// The storage listing returned nothing under the metadata prefix.
    #[display("storage listing returned no metadata files")]
    EmptyListing,
    /// A metadata file could not be read.
    #[display("could not fetch metadata file: {_0}")]
    Fetch(#[error(not(source))] String),
    /// A metadata file was read but is malformed.
    #[display("malformed metadata file: {_0}")]
    Parse(#[error(not(source))] String),
    /// A catalog query failed.
    #[display("could not query the catalog")]
    Catalog,
    /// A catalog write or delete failed.
    #[display("could not persist catalog record: {_0}")]
    Persist(#[error(not(source))] String),
    /// The data change happened, but the notification was not delivered.
    #[display("could not deliver notification")]
    Notify,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Event flows are safe to redeliver: merges keep identity stable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Fetch(_) | Self::Catalog | Self::Persist(_) | Self::Notify)
    }
}
