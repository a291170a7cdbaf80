//! Reconciliation of metadata files with the catalog.
//!
//! Three independent engines share the record model:
//! - [`diff()`] compares the storage listing with the catalog;
//! - [`merge()`] decides which fields of an existing record survive an update;
//! - [`resolve_deletion()`] picks the record to remove for a deleted file.
//!
//! [`Reconciler`] wires them to storage, the catalog and the notifier for the
//! three triggers: a batch sync, an object-created event and an
//! object-removed event.

mod delete;
mod diff;
pub mod error;
mod merge;
pub mod palette;
mod reconciler;

pub use crate::delete::{Deletion, resolve_deletion};
pub use crate::diff::{Diff, diff};
pub use crate::merge::{RandomSeeder, Seed, Seeder, TIMESTAMP_FORMAT, Upsert, merge};
pub use crate::reconciler::{ReconcileConfig, Reconciler, SyncReport};
