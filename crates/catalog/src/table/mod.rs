//! Catalog table trait and implementations.
//!
//! Production runs against DynamoDB; SQLite serves local development, and
//! an in-memory table backs the tests of other crates.

#[cfg(feature = "dynamodb")]
mod dynamo;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod ro;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "dynamodb")]
pub use self::dynamo::DynamoTable;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockTable;
pub use self::ro::ReadOnlyTable;
#[cfg(feature = "sqlite")]
pub use self::sqlite::SqliteTable;
use crate::CatalogRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Unified interface for catalog tables.
///
/// Uniqueness of `fileName` is not enforced by any implementation: callers
/// take the first match of [`query_by_file_name()`](Self::query_by_file_name).
#[async_trait]
pub trait CatalogTable: Send + Sync {
    /// Name of the configured table, used for logging only.
    fn name(&self) -> &str;

    /// All records with the given `fileName`, oldest first.
    async fn query_by_file_name(&self, file_name: &str) -> Result<Vec<CatalogRecord>>;

    /// All records with the given `media` discriminator, oldest first.
    async fn query_by_media(&self, media: &str) -> Result<Vec<CatalogRecord>>;

    /// Write a record, fully replacing any record with the same `id`.
    async fn put_item(&self, record: &CatalogRecord) -> Result<()>;

    /// Delete the record with the given `id`.
    ///
    /// Deleting an `id` that does not exist succeeds.
    async fn delete_item(&self, id: &str) -> Result<()>;
}
