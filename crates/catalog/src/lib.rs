//! The catalog of published entries.
//!
//! The catalog is a derived view: every record mirrors one metadata file in
//! object storage, and the reconciler is the only writer. Records are looked
//! up two ways, mirroring the two secondary indexes of the production table:
//! - by `fileName`, the business key shared with the metadata object key;
//! - by `media`, a constant discriminator, which returns the whole catalog
//!   ordered by creation time.

pub mod error;
mod record;
pub mod table;

pub use crate::record::CatalogRecord;
pub use crate::table::CatalogTable;
use std::sync::Arc;

pub type TableHandle = Arc<dyn CatalogTable + Send + Sync>;
