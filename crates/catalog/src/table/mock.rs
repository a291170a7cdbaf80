//! In-memory catalog table for testing.

use crate::error::{ErrorKind, Result};
use crate::{CatalogRecord, CatalogTable};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory catalog table for testing.
///
/// Records are kept in insertion order behind a [`RwLock`]. Successful
/// writes are counted, and each operation family can be made to fail.
///
/// # Examples
///
/// ```
/// use sublog_catalog::{CatalogTable, table::MockTable};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = MockTable::default();
/// assert!(table.query_by_file_name("hello").await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockTable {
    records: RwLock<Vec<CatalogRecord>>,
    writes: AtomicUsize,
    fail_queries: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockTable {
    pub fn with_records(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        Self { records: RwLock::new(records.into_iter().collect()), ..Self::default() }
    }

    /// Make every subsequent query fail with a service error.
    pub fn fail_queries(self) -> Self {
        self.fail_queries.store(true, Ordering::SeqCst);
        self
    }

    /// Make every subsequent put and delete fail with a service error.
    pub fn fail_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Snapshot of the stored records.
    pub async fn records(&self) -> Vec<CatalogRecord> {
        self.records.read().await.clone()
    }

    /// Number of successful puts and deletes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Service(format!("mock {operation} failure")));
        }
        Ok(())
    }

    async fn query(&self, filter: impl Fn(&CatalogRecord) -> bool) -> Result<Vec<CatalogRecord>> {
        Self::check(&self.fail_queries, "query")?;
        let mut matches: Vec<_> = self.records.read().await.iter().filter(|&r| filter(r)).cloned().collect();
        // Stable sort keeps insertion order for equal timestamps.
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }
}

#[async_trait]
impl CatalogTable for MockTable {
    fn name(&self) -> &str {
        "mock"
    }

    async fn query_by_file_name(&self, file_name: &str) -> Result<Vec<CatalogRecord>> {
        self.query(|r| r.file_name == file_name).await
    }

    async fn query_by_media(&self, media: &str) -> Result<Vec<CatalogRecord>> {
        self.query(|r| r.media == media).await
    }

    async fn put_item(&self, record: &CatalogRecord) -> Result<()> {
        Self::check(&self.fail_writes, "put")?;
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        Self::check(&self.fail_writes, "delete")?;
        self.records.write().await.retain(|r| r.id != id);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
