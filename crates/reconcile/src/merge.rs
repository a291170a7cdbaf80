use crate::error::{ErrorKind, Result};
use crate::palette;
use exn::ResultExt;
use sublog_catalog::CatalogRecord;
use sublog_meta::MetadataFile;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// `YYYY-MM-DD HH:MM:SS`, always UTC.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Freshly generated values for a candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub id: String,
    /// Formatted with [`TIMESTAMP_FORMAT`].
    pub now: String,
    pub accent: String,
}

/// Source of [`Seed`]s.
pub trait Seeder: Send + Sync {
    fn seed(&self) -> Result<Seed>;
}

/// UUIDv4 identifiers, the current UTC time and a random palette colour.
#[derive(Debug, Clone)]
pub struct RandomSeeder {
    palette: Vec<String>,
}

impl RandomSeeder {
    pub fn new(palette: Vec<String>) -> Self {
        Self { palette }
    }
}

impl Default for RandomSeeder {
    fn default() -> Self {
        Self::new(palette::default_palette())
    }
}

impl Seeder for RandomSeeder {
    fn seed(&self) -> Result<Seed> {
        let now = OffsetDateTime::now_utc().format(TIMESTAMP_FORMAT).or_raise(|| ErrorKind::Configuration)?;
        let accent = palette::pick(&mut rand::thread_rng(), &self.palette).unwrap_or_default().to_string();
        Ok(Seed { id: uuid::Uuid::new_v4().to_string(), now, accent })
    }
}

/// Build the record to persist for a metadata file.
///
/// The candidate takes every field from the metadata and the seed. If a
/// record for the same `fileName` already exists, exactly `id`, `createdAt`
/// and `eyeCatchURL` are carried over from it, so reprocessing a file never
/// changes its identity. A `createdAt` or `eyeCatchURL` that the stored row
/// lost (decoded as empty) keeps the generated value instead.
pub fn merge(meta: MetadataFile, existing: Option<&CatalogRecord>, seed: Seed, media: &str) -> CatalogRecord {
    let mut record = CatalogRecord {
        id: seed.id,
        file_name: meta.file_name,
        media: media.to_string(),
        category: meta.category,
        tag: meta.tag,
        title: meta.title,
        created_at: seed.now.clone(),
        updated_at: seed.now,
        eye_catch_url: seed.accent,
    };
    if let Some(existing) = existing {
        record.id.clone_from(&existing.id);
        if !existing.created_at.is_empty() {
            record.created_at.clone_from(&existing.created_at);
        }
        if !existing.eye_catch_url.is_empty() {
            record.eye_catch_url.clone_from(&existing.eye_catch_url);
        }
    }
    record
}

/// What a successful upsert did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Created(CatalogRecord),
    Updated(CatalogRecord),
}

impl Upsert {
    pub fn record(&self) -> &CatalogRecord {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }
}
