//! Storage models.

use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Object metadata returned by storage backends.
///
/// Listing results only; the object body is fetched separately with
/// [`read()`](crate::StorageBackend::read).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Object key relative to the backend root
    pub path: PathBuf,
    /// Object size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        Self { path: path.into(), size, modified }
    }

    /// The object key as a `/`-separated string.
    ///
    /// Keys are validated on the way in, so lossy conversion only affects
    /// non-UTF8 local filenames, which can never match a metadata key anyway.
    pub fn key(&self) -> String {
        key_of(&self.path)
    }
}

pub(crate) fn key_of(path: &Path) -> String {
    path.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}
