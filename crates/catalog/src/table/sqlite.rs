//! SQLite catalog table for local development.
//!
//! Mirrors the production table closely enough to dry-run and debug the
//! reconciler without AWS: records are keyed by `id`, indexed by `file_name`
//! and by `(media, created_at)`. Tags are stored as a JSON array.

use crate::error::{ErrorKind, Result};
use crate::{CatalogRecord, CatalogTable};
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use tracing::instrument;

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// One reconciler writes at a time; a couple of connections is plenty.
const MAX_CONNECTIONS: u32 = 2;

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    file_name: String,
    media: String,
    category: String,
    tag: String,
    title: String,
    created_at: String,
    updated_at: String,
    eye_catch_url: String,
}
impl TryFrom<RecordRow> for CatalogRecord {
    type Error = crate::error::Error;
    fn try_from(row: RecordRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            file_name: row.file_name,
            media: row.media,
            category: row.category,
            tag: serde_json::from_str(&row.tag).or_raise(|| ErrorKind::InvalidItem("tag"))?,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
            eye_catch_url: row.eye_catch_url,
        })
    }
}

/// SQLite catalog table.
#[derive(Debug, Clone)]
pub struct SqliteTable {
    pool: SqlitePool,
}

impl SqliteTable {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let table = Self { pool };
        table.migrate().await?;
        Ok(table)
    }

    /// Connect to the catalog database at the given path.
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect to an in-memory database (useful for testing).
    ///
    /// In-memory databases are destroyed when the connection closes, and
    /// must be limited to one connection so every query sees the same data.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        Self::new(options, Some(1)).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_millis(1500))
    }

    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch(&self, query: &'static str, value: &str) -> Result<Vec<CatalogRecord>> {
        let rows: Vec<RecordRow> =
            sqlx::query_as(query).bind(value).fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(CatalogRecord::try_from).collect()
    }
}

#[async_trait]
impl CatalogTable for SqliteTable {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn query_by_file_name(&self, file_name: &str) -> Result<Vec<CatalogRecord>> {
        self.fetch(include_str!("../../queries/query_by_file_name.sql"), file_name).await
    }

    async fn query_by_media(&self, media: &str) -> Result<Vec<CatalogRecord>> {
        self.fetch(include_str!("../../queries/query_by_media.sql"), media).await
    }

    async fn put_item(&self, record: &CatalogRecord) -> Result<()> {
        let tag = serde_json::to_string(&record.tag).or_raise(|| ErrorKind::InvalidItem("tag"))?;
        sqlx::query(include_str!("../../queries/put_item.sql"))
            .bind(&record.id)
            .bind(&record.file_name)
            .bind(&record.media)
            .bind(&record.category)
            .bind(tag)
            .bind(&record.title)
            .bind(&record.created_at)
            .bind(&record.updated_at)
            .bind(&record.eye_catch_url)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        sqlx::query(include_str!("../../queries/delete_item.sql"))
            .bind(id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}
