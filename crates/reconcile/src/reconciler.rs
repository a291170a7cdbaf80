use crate::delete::{Deletion, resolve_deletion};
use crate::diff::diff;
use crate::error::{Error, ErrorKind, Result};
use crate::merge::{RandomSeeder, Seeder, Upsert, merge};
use crate::palette;
use exn::{Frame, ResultExt};
use std::collections::HashMap;
use std::path::Path;
use sublog_catalog::{CatalogRecord, TableHandle};
use sublog_meta::{KeyLayout, MetadataFile};
use sublog_notify::{Message, NotifierHandle};
use sublog_storage::BackendHandle;
use tracing::instrument;

/// Settings shared by every flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Discriminator written to every record and used to list the catalog.
    pub media: String,
    pub layout: KeyLayout,
    pub palette: Vec<String>,
    /// Sender name of every notification.
    pub source: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            media: "sublog".to_string(),
            layout: KeyLayout::default(),
            palette: palette::default_palette(),
            source: "sublog".to_string(),
        }
    }
}

/// Outcome of a batch sync, as `fileName` lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    /// Catalog records whose metadata file is gone. Reported, never deleted.
    pub stale: Vec<String>,
    /// Metadata files that could not be fetched or parsed.
    pub skipped: Vec<String>,
}

impl SyncReport {
    fn summary(&self) -> String {
        let mut summary = format!(
            "Synchronised metadata: {} created, {} updated, {} skipped",
            self.created.len(),
            self.updated.len(),
            self.skipped.len(),
        );
        if !self.skipped.is_empty() {
            summary.push_str(&format!("\n skipped: {}", self.skipped.join(", ")));
        }
        if !self.stale.is_empty() {
            summary.push_str(&format!("\n catalog records without metadata: {}", self.stale.join(", ")));
        }
        summary
    }
}

/// Runs the reconciliation flows against storage, the catalog and the
/// notifier.
///
/// Every flow re-reads its state; nothing is cached between calls.
pub struct Reconciler {
    backend: BackendHandle,
    table: TableHandle,
    notifier: NotifierHandle,
    config: ReconcileConfig,
    seeder: Box<dyn Seeder>,
}

impl Reconciler {
    pub fn new(backend: BackendHandle, table: TableHandle, notifier: NotifierHandle, config: ReconcileConfig) -> Self {
        let seeder = Box::new(RandomSeeder::new(config.palette.clone()));
        Self { backend, table, notifier, config, seeder }
    }

    /// Replace the source of identifiers, timestamps and accents.
    pub fn with_seeder(mut self, seeder: impl Seeder + 'static) -> Self {
        self.seeder = Box::new(seeder);
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile every metadata file in storage with the catalog.
    ///
    /// Files that cannot be fetched or parsed are skipped. Catalog records
    /// without a metadata file are reported as stale and left in place.
    #[instrument(skip(self), fields(media = %self.config.media))]
    pub async fn sync(&self) -> Result<SyncReport> {
        match self.try_sync().await {
            Ok(report) => {
                tracing::info!(
                    created = report.created.len(),
                    updated = report.updated.len(),
                    stale = report.stale.len(),
                    skipped = report.skipped.len(),
                    "Sync complete"
                );
                self.notify(report.summary()).await?;
                Ok(report)
            },
            Err(err) => {
                self.notify_failure(&err).await;
                Err(err)
            },
        }
    }

    async fn try_sync(&self) -> Result<SyncReport> {
        let layout = &self.config.layout;
        let listing = self.backend.list(layout.dir().map(Path::new)).await.or_raise(|| ErrorKind::Storage)?;
        let storage_ids: Vec<String> = listing
            .iter()
            .filter_map(|file| {
                let key = file.key();
                let file_name = layout.file_name(&key).map(str::to_string);
                if file_name.is_none() {
                    tracing::debug!(key = %key, "Ignoring object outside the metadata layout");
                }
                file_name
            })
            .collect();
        // Nothing to reconcile against: every catalog row would look stale.
        if storage_ids.is_empty() {
            tracing::debug!(objects = listing.len(), "Listing holds no metadata files");
            exn::bail!(ErrorKind::EmptyListing);
        }

        let records = self.table.query_by_media(&self.config.media).await.or_raise(|| ErrorKind::Catalog)?;
        let mut existing: HashMap<&str, &CatalogRecord> = HashMap::new();
        for record in &records {
            existing.entry(record.file_name.as_str()).or_insert(record);
        }

        let diff = diff(storage_ids, records.iter().map(|r| r.file_name.as_str()));
        tracing::debug!(
            create = diff.to_create.len(),
            update = diff.to_update.len(),
            delete = diff.to_delete.len(),
            "Computed listing diff"
        );
        let mut report = SyncReport::default();
        for file_name in diff.to_create_or_update() {
            let meta = match self.fetch(file_name).await {
                Ok(meta) => meta,
                Err(err) => {
                    tracing::warn!(file_name, error = ?err, "Skipping metadata file");
                    report.skipped.push(file_name.to_string());
                    continue;
                },
            };
            match self.persist(meta, existing.get(file_name).copied()).await? {
                Upsert::Created(record) => report.created.push(record.file_name),
                Upsert::Updated(record) => report.updated.push(record.file_name),
            }
        }
        for file_name in &diff.to_delete {
            tracing::warn!(file_name = %file_name, "Catalog record has no metadata file; leaving it in place");
        }
        report.stale = diff.to_delete.into_iter().collect();
        Ok(report)
    }

    /// Create or update the record for one metadata file.
    #[instrument(skip(self))]
    pub async fn upsert(&self, file_name: &str) -> Result<Upsert> {
        match self.try_upsert(file_name).await {
            Ok(upsert) => {
                let (verb, record) = match &upsert {
                    Upsert::Created(record) => ("Created", record),
                    Upsert::Updated(record) => ("Updated", record),
                };
                tracing::info!(id = %record.id, "{verb} catalog record");
                self.notify(format!(
                    "{verb} entry metadata\n title: {}\n fileName: {}",
                    record.title, record.file_name
                ))
                .await?;
                Ok(upsert)
            },
            Err(err) => {
                self.notify_failure(&err).await;
                Err(err)
            },
        }
    }

    async fn try_upsert(&self, file_name: &str) -> Result<Upsert> {
        let matches = self.table.query_by_file_name(file_name).await.or_raise(|| ErrorKind::Catalog)?;
        if matches.len() > 1 {
            tracing::warn!(count = matches.len(), "Several catalog records share this file name; using the first");
        }
        let meta = self.fetch(file_name).await?;
        self.persist(meta, matches.first()).await
    }

    /// Remove the record of a deleted metadata file, if there is one.
    #[instrument(skip(self))]
    pub async fn delete(&self, file_name: &str) -> Result<Deletion> {
        match self.try_delete(file_name).await {
            Ok(Deletion::NoMatch) => {
                tracing::info!("No catalog record to delete");
                Ok(Deletion::NoMatch)
            },
            Ok(Deletion::Deleted { id }) => {
                tracing::info!(id = %id, "Deleted catalog record");
                self.notify(format!("Deleted entry metadata\n fileName: {file_name}\n id: {id}")).await?;
                Ok(Deletion::Deleted { id })
            },
            Err(err) => {
                self.notify_failure(&err).await;
                Err(err)
            },
        }
    }

    async fn try_delete(&self, file_name: &str) -> Result<Deletion> {
        let matches = self.table.query_by_file_name(file_name).await.or_raise(|| ErrorKind::Catalog)?;
        let Some(id) = resolve_deletion(&matches) else {
            return Ok(Deletion::NoMatch);
        };
        self.table.delete_item(id).await.or_raise(|| ErrorKind::Persist(file_name.to_string()))?;
        Ok(Deletion::Deleted { id: id.to_string() })
    }

    async fn fetch(&self, file_name: &str) -> Result<MetadataFile> {
        let key = self.config.layout.key(file_name);
        let data = self.backend.read(Path::new(&key)).await.or_raise(|| ErrorKind::Fetch(key.clone()))?;
        MetadataFile::parse(file_name, &data).or_raise(|| ErrorKind::Parse(key))
    }

    async fn persist(&self, meta: MetadataFile, existing: Option<&CatalogRecord>) -> Result<Upsert> {
        let seed = self.seeder.seed()?;
        let file_name = meta.file_name.clone();
        let record = merge(meta, existing, seed, &self.config.media);
        self.table.put_item(&record).await.or_raise(|| ErrorKind::Persist(file_name))?;
        Ok(match existing {
            Some(_) => Upsert::Updated(record),
            None => Upsert::Created(record),
        })
    }

    async fn notify(&self, content: String) -> Result<()> {
        let message = Message::new(&self.config.source, content);
        self.notifier
            .post(&message)
            .await
            .or_raise(|| ErrorKind::Notify)
            .inspect_err(|err| tracing::error!(error = ?err, "Change applied, but the notification was not delivered"))
    }

    /// Best effort: a failed failure notification is logged, never returned.
    async fn notify_failure(&self, err: &Error) {
        tracing::error!(error = ?err, "Reconciliation failed");
        let message = Message::new(&self.config.source, format!("## Exception\n{}", describe(err)));
        if let Err(notify_err) = self.notifier.post(&message).await {
            tracing::error!(error = ?notify_err, "Failure notification was not delivered");
        }
    }
}

/// The error followed by every cause, one per line, indented by depth.
fn describe(err: &Error) -> String {
    fn causes(frame: &Frame, depth: usize, out: &mut String) {
        for child in frame.children() {
            out.push_str(&format!("\n{}- {child}", "  ".repeat(depth)));
            causes(child, depth + 1, out);
        }
    }
    let mut out = err.to_string();
    causes(err.frame(), 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::fixtures::CountingSeeder;
    use rstest::rstest;
    use std::sync::Arc;
    use sublog_catalog::table::{MockTable, ReadOnlyTable};
    use sublog_notify::MockNotifier;
    use sublog_storage::backend::MockBackend;

    const HELLO: &str = "category = \"tech\"\ntag = [\"a\", \"b\"]\ntitle = \"Hello\"\n";
    const NO_TITLE: &str = "category = \"tech\"\ntag = [\"a\"]\n";

    fn existing(id: &str, file_name: &str) -> CatalogRecord {
        CatalogRecord {
            id: id.to_string(),
            file_name: file_name.to_string(),
            media: "sublog".to_string(),
            category: "old".to_string(),
            tag: vec!["old".to_string()],
            title: format!("Old {file_name}"),
            created_at: "2023-01-01 00:00:00".to_string(),
            updated_at: "2023-01-01 00:00:00".to_string(),
            eye_catch_url: "Black".to_string(),
        }
    }

    struct Harness {
        table: Arc<MockTable>,
        notifier: Arc<MockNotifier>,
        reconciler: Reconciler,
    }

    fn harness(backend: MockBackend, table: MockTable, notifier: MockNotifier) -> Harness {
        let table = Arc::new(table);
        let notifier = Arc::new(notifier);
        let reconciler =
            Reconciler::new(Arc::new(backend), table.clone(), notifier.clone(), ReconcileConfig::default())
                .with_seeder(CountingSeeder::default());
        Harness { table, notifier, reconciler }
    }

    async fn record_of(table: &MockTable, file_name: &str) -> CatalogRecord {
        let mut matches = table.query_by_file_name(file_name).await.unwrap();
        assert_eq!(matches.len(), 1, "expected one record for {file_name}");
        matches.remove(0)
    }

    use sublog_catalog::CatalogTable as _;

    #[tokio::test]
    async fn test_sync_creates_updates_and_reports_stale() {
        let backend = MockBackend::with_files([("meta/a.toml", HELLO), ("meta/b.toml", HELLO), ("meta/c.toml", HELLO)]);
        let table = MockTable::with_records([existing("old-b", "b"), existing("old-c", "c"), existing("old-d", "d")]);
        let h = harness(backend, table, MockNotifier::default());

        let report = h.reconciler.sync().await.unwrap();
        assert_eq!(report.created, vec!["a"]);
        assert_eq!(report.updated, vec!["b", "c"]);
        assert_eq!(report.stale, vec!["d"]);
        assert!(report.skipped.is_empty());

        // Stale records are left alone.
        assert_eq!(h.table.writes(), 3);
        assert_eq!(record_of(&h.table, "d").await, existing("old-d", "d"));
        // Updates keep identity and take the new content.
        let b = record_of(&h.table, "b").await;
        assert_eq!((b.id.as_str(), b.created_at.as_str(), b.eye_catch_url.as_str()), ("old-b", "2023-01-01 00:00:00", "Black"));
        assert_eq!(b.title, "Hello");
        assert_eq!(record_of(&h.table, "a").await.id, "id-1");

        let messages = h.notifier.messages().await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("1 created, 2 updated"));
        assert!(messages[0].content.contains("catalog records without metadata: d"));
    }

    #[tokio::test]
    async fn test_sync_skips_malformed_and_foreign_objects() {
        let backend = MockBackend::with_files([
            ("meta/a.toml", HELLO),
            ("meta/bad.toml", NO_TITLE),
            ("meta/readme.md", "# not metadata"),
            ("images/cover.toml", HELLO),
        ]);
        let h = harness(backend, MockTable::default(), MockNotifier::default());

        let report = h.reconciler.sync().await.unwrap();
        assert_eq!(report.created, vec!["a"]);
        assert_eq!(report.skipped, vec!["bad"]);
        assert!(h.table.query_by_file_name("bad").await.unwrap().is_empty());
        assert_eq!(h.table.writes(), 1);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let backend = MockBackend::with_files([("meta/a.toml", HELLO)]);
        let h = harness(backend, MockTable::default(), MockNotifier::default());
        h.reconciler.sync().await.unwrap();
        let first = record_of(&h.table, "a").await;
        let report = h.reconciler.sync().await.unwrap();
        assert_eq!(report.updated, vec!["a"]);
        let second = record_of(&h.table, "a").await;
        assert_eq!(second, CatalogRecord { updated_at: second.updated_at.clone(), ..first.clone() });
        assert_ne!(second.updated_at, first.updated_at);
    }

    #[rstest]
    #[case::empty(MockBackend::with_files([("images/cover.png", "png")]), ErrorKind::EmptyListing)]
    #[case::no_metadata_keys(MockBackend::with_files([("meta/readme.md", "# notes")]), ErrorKind::EmptyListing)]
    #[case::unavailable(MockBackend::with_files([("meta/a.toml", HELLO)]).fail_listing(), ErrorKind::Storage)]
    #[tokio::test]
    async fn test_sync_listing_failures_are_fatal(#[case] backend: MockBackend, #[case] expected: ErrorKind) {
        let h = harness(backend, MockTable::with_records([existing("old-d", "d")]), MockNotifier::default());
        let err = h.reconciler.sync().await.unwrap_err();
        assert_eq!(*err, expected);
        assert_eq!(h.table.writes(), 0);
        let messages = h.notifier.messages().await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.starts_with("## Exception"));
    }

    #[tokio::test]
    async fn test_sync_skips_unreadable_objects() {
        let backend = MockBackend::with_files([("meta/a.toml", HELLO), ("meta/b.toml", HELLO), ("meta/c.toml", HELLO)])
            .fail_read("meta/b.toml");
        let h = harness(backend, MockTable::default(), MockNotifier::default());

        let report = h.reconciler.sync().await.unwrap();
        assert_eq!(report.created, vec!["a", "c"]);
        assert_eq!(report.skipped, vec!["b"]);
        assert_eq!(h.table.writes(), 2);
        assert!(h.table.query_by_file_name("b").await.unwrap().is_empty());
        let messages = h.notifier.messages().await;
        assert!(messages[0].content.contains("2 created, 0 updated, 1 skipped\n skipped: b"));
    }

    #[tokio::test]
    async fn test_catalog_query_failure_writes_nothing() {
        let backend = MockBackend::with_files([("meta/a.toml", HELLO)]);
        let table = MockTable::with_records([existing("old-a", "a")]).fail_queries();
        let h = harness(backend, table, MockNotifier::default());

        assert_eq!(*h.reconciler.sync().await.unwrap_err(), ErrorKind::Catalog);
        assert_eq!(*h.reconciler.upsert("a").await.unwrap_err(), ErrorKind::Catalog);
        assert_eq!(*h.reconciler.delete("a").await.unwrap_err(), ErrorKind::Catalog);
        assert_eq!(h.table.writes(), 0);
        assert_eq!(h.table.records().await, vec![existing("old-a", "a")]);
        let messages = h.notifier.messages().await;
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.content.starts_with("## Exception\ncould not query the catalog")));
    }

    #[tokio::test]
    async fn test_sync_persist_failure_is_fatal() {
        let backend = MockBackend::with_files([("meta/a.toml", HELLO), ("meta/b.toml", HELLO)]);
        let h = harness(backend, MockTable::default().fail_writes(), MockNotifier::default());
        let err = h.reconciler.sync().await.unwrap_err();
        assert_eq!(*err, ErrorKind::Persist("a".to_string()));
        assert!(h.notifier.messages().await[0].content.starts_with("## Exception"));
    }

    #[tokio::test]
    async fn test_sync_through_read_only_table_writes_nothing() {
        let backend = Arc::new(MockBackend::with_files([("meta/a.toml", HELLO), ("meta/b.toml", HELLO)]));
        let inner = Arc::new(MockTable::with_records([existing("old-b", "b")]));
        let reconciler = Reconciler::new(
            backend,
            Arc::new(ReadOnlyTable::new(inner.clone())),
            Arc::new(MockNotifier::default()),
            ReconcileConfig::default(),
        );
        let report = reconciler.sync().await.unwrap();
        assert_eq!(report.created, vec!["a"]);
        assert_eq!(inner.writes(), 0);
        assert_eq!(inner.records().await, vec![existing("old-b", "b")]);
    }

    #[tokio::test]
    async fn test_upsert_creates_and_notifies() {
        let backend = MockBackend::with_files([("meta/post-1.toml", HELLO)]);
        let h = harness(backend, MockTable::default(), MockNotifier::default());

        let upsert = h.reconciler.upsert("post-1").await.unwrap();
        let Upsert::Created(record) = upsert else { panic!("expected a new record") };
        assert_eq!(record, record_of(&h.table, "post-1").await);
        assert_eq!(record.created_at, record.updated_at);

        let messages = h.notifier.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].to_string(),
            "Message from sublog : Created entry metadata\n title: Hello\n fileName: post-1"
        );
    }

    #[tokio::test]
    async fn test_upsert_round_trip_keeps_identity() {
        let backend = Arc::new(MockBackend::with_files([("meta/post-1.toml", HELLO)]));
        let table = Arc::new(MockTable::default());
        let reconciler = Reconciler::new(
            backend.clone(),
            table.clone(),
            Arc::new(MockNotifier::default()),
            ReconcileConfig::default(),
        )
        .with_seeder(CountingSeeder::default());

        let created = reconciler.upsert("post-1").await.unwrap().record().clone();
        backend
            .insert("meta/post-1.toml", "category = \"tech\"\ntag = [\"a\", \"b\"]\ntitle = \"Hello World\"\n")
            .await;
        let updated = reconciler.upsert("post-1").await.unwrap();
        assert!(matches!(updated, Upsert::Updated(_)));
        let updated = updated.record();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.eye_catch_url, created.eye_catch_url);
        assert_eq!(updated.title, "Hello World");
        assert_ne!(updated.updated_at, created.updated_at);
        assert_eq!(table.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_malformed_payload_writes_nothing() {
        let backend = MockBackend::with_files([("meta/post-1.toml", NO_TITLE)]);
        let h = harness(backend, MockTable::default(), MockNotifier::default());

        let err = h.reconciler.upsert("post-1").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Parse("meta/post-1.toml".to_string()));
        assert_eq!(h.table.writes(), 0);
        let messages = h.notifier.messages().await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.starts_with("## Exception"));
        assert!(messages[0].content.contains("missing required field: title"));
    }

    #[tokio::test]
    async fn test_upsert_missing_file() {
        let h = harness(MockBackend::default(), MockTable::default(), MockNotifier::default());
        let err = h.reconciler.upsert("post-1").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Fetch("meta/post-1.toml".to_string()));
        assert_eq!(h.table.writes(), 0);
    }

    #[tokio::test]
    async fn test_upsert_notification_failure_keeps_the_write() {
        let backend = MockBackend::with_files([("meta/post-1.toml", HELLO)]);
        let h = harness(backend, MockTable::default(), MockNotifier::default().failing());
        let err = h.reconciler.upsert("post-1").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Notify);
        assert_eq!(h.table.writes(), 1);
    }

    #[tokio::test]
    async fn test_upsert_failure_with_failing_notifier_returns_original_error() {
        let backend = MockBackend::with_files([("meta/post-1.toml", HELLO)]);
        let h = harness(backend, MockTable::default().fail_writes(), MockNotifier::default().failing());
        let err = h.reconciler.upsert("post-1").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Persist("post-1".to_string()));
    }

    #[tokio::test]
    async fn test_delete_without_match_issues_no_delete() {
        let table = MockTable::with_records([existing("old-a", "a")]);
        let h = harness(MockBackend::default(), table, MockNotifier::default());
        assert_eq!(h.reconciler.delete("post-1").await.unwrap(), Deletion::NoMatch);
        assert_eq!(h.table.writes(), 0);
        assert!(h.notifier.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_match_deletes_by_id() {
        let table = MockTable::with_records([existing("old-a", "a"), existing("old-b", "b")]);
        let h = harness(MockBackend::default(), table, MockNotifier::default());
        assert_eq!(h.reconciler.delete("a").await.unwrap(), Deletion::Deleted { id: "old-a".to_string() });
        assert_eq!(h.table.writes(), 1);
        assert_eq!(h.table.records().await, vec![existing("old-b", "b")]);
        assert!(h.notifier.messages().await[0].content.contains("id: old-a"));
    }

    #[tokio::test]
    async fn test_delete_with_duplicates_removes_first_only() {
        let mut newer = existing("new-a", "a");
        newer.created_at = "2024-01-01 00:00:00".to_string();
        let table = MockTable::with_records([newer.clone(), existing("old-a", "a")]);
        let h = harness(MockBackend::default(), table, MockNotifier::default());
        assert_eq!(h.reconciler.delete("a").await.unwrap(), Deletion::Deleted { id: "old-a".to_string() });
        assert_eq!(h.table.records().await, vec![newer]);
    }

    #[tokio::test]
    async fn test_delete_removes_damaged_dynamodb_row() {
        use aws_sdk_dynamodb::Client;
        use aws_sdk_dynamodb::operation::{delete_item::DeleteItemOutput, query::QueryOutput};
        use aws_sdk_dynamodb::types::AttributeValue;
        use aws_smithy_mocks::{RuleMode, mock, mock_client};
        use sublog_catalog::table::DynamoTable;

        // Only the key attributes survived.
        let query = mock!(Client::query).then_output(|| {
            QueryOutput::builder()
                .items(std::collections::HashMap::from([
                    ("id".to_string(), AttributeValue::S("old-a".to_string())),
                    ("fileName".to_string(), AttributeValue::S("a".to_string())),
                ]))
                .build()
        });
        let delete = mock!(Client::delete_item)
            .match_requests(|req| {
                req.key().and_then(|key| key.get("id")).and_then(|v| v.as_s().ok()) == Some(&"old-a".to_string())
            })
            .then_output(|| DeleteItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&query, &delete]);
        let table = DynamoTable::from_client(client, "sublog", "fileName-index", "media-createdAt-index");
        let notifier = Arc::new(MockNotifier::default());
        let reconciler =
            Reconciler::new(Arc::new(MockBackend::default()), Arc::new(table), notifier.clone(), ReconcileConfig::default());

        assert_eq!(reconciler.delete("a").await.unwrap(), Deletion::Deleted { id: "old-a".to_string() });
        assert_eq!(delete.num_calls(), 1);
        assert!(notifier.messages().await[0].content.contains("id: old-a"));
    }

    #[tokio::test]
    async fn test_upsert_repairs_damaged_row() {
        let damaged = CatalogRecord {
            category: String::new(),
            title: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
            eye_catch_url: String::new(),
            ..existing("old-a", "a")
        };
        let backend = MockBackend::with_files([("meta/a.toml", HELLO)]);
        let h = harness(backend, MockTable::with_records([damaged]), MockNotifier::default());

        let record = h.reconciler.upsert("a").await.unwrap().record().clone();
        assert_eq!(record.id, "old-a");
        assert_eq!(record.title, "Hello");
        assert!(!record.created_at.is_empty());
        assert!(!record.eye_catch_url.is_empty());
        assert_eq!(record_of(&h.table, "a").await, record);
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported_and_raised() {
        let table = MockTable::with_records([existing("old-a", "a")]).fail_writes();
        let h = harness(MockBackend::default(), table, MockNotifier::default());
        let err = h.reconciler.delete("a").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Persist("a".to_string()));
        assert!(h.notifier.messages().await[0].content.starts_with("## Exception"));
    }

    #[test]
    fn test_describe_renders_every_cause() {
        let fetch = exn::Exn::new(ErrorKind::Storage).raise(ErrorKind::Fetch("meta/a.toml".to_string()));
        let err = exn::Exn::raise_all::<ErrorKind, _>(ErrorKind::Catalog, [fetch, exn::Exn::new(ErrorKind::Notify)]);
        assert_eq!(
            describe(&err),
            "could not query the catalog\n\
             - could not fetch metadata file: meta/a.toml\n\
             \x20 - could not list metadata files\n\
             - could not deliver notification"
        );
    }
}
