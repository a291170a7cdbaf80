//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, a unified interface over
//! the places metadata files live: an S3 bucket in production, a local
//! directory for development, and an in-memory map for tests.

mod local;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
#[cfg(feature = "s3")]
pub use self::s3::S3Backend;
use crate::error::Result;
use crate::models::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface for storage backends.
///
/// Metadata files are only ever listed and read; the reconciler never
/// modifies the bucket. The production backend is a network service. Paths are object keys relative to the backend root and are
/// validated with [`validate_path`](crate::validate_path) by every
/// implementation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sublog_storage::{backend::StorageBackend, error::Result};
///
/// async fn metadata_keys(backend: &dyn StorageBackend) -> Result<Vec<String>> {
///     let files = backend.list(Some(Path::new("meta"))).await?;
///     Ok(files.iter().map(|f| f.key()).collect())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// List all objects under an optional prefix.
    ///
    /// Collects [`list_stream()`](Self::list_stream) into a [`Vec`].
    async fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream object metadata under an optional prefix.
    ///
    /// The prefix is matched per path component: `meta` matches
    /// `meta/post-1.toml` but not `metadata/post-1.toml`. A prefix with no
    /// objects under it yields an empty stream, not an error.
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a>;

    /// Read the complete object body.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the object
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
}
