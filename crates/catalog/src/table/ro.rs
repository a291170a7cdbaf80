//! Read-only catalog table.
//!
//! Wraps another table and prevents write operations from executing, while
//! indicating success on return. Backs the `--dry-run` flag.

use crate::error::Result;
use crate::{CatalogRecord, CatalogTable, TableHandle};
use async_trait::async_trait;

/// Read-only catalog table.
///
/// Queries go to the wrapped table; writes are dropped after logging an
/// [`info event`](tracing::Event).
#[derive(Clone)]
pub struct ReadOnlyTable {
    inner: TableHandle,
}
impl ReadOnlyTable {
    pub fn new(inner: TableHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CatalogTable for ReadOnlyTable {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn query_by_file_name(&self, file_name: &str) -> Result<Vec<CatalogRecord>> {
        self.inner.query_by_file_name(file_name).await
    }

    async fn query_by_media(&self, media: &str) -> Result<Vec<CatalogRecord>> {
        self.inner.query_by_media(media).await
    }

    async fn put_item(&self, record: &CatalogRecord) -> Result<()> {
        tracing::info!(id = %record.id, file_name = %record.file_name, "Skipping put during dry run");
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        tracing::info!(id, "Skipping delete during dry run");
        Ok(())
    }
}
