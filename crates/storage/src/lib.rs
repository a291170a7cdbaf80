//! Object storage access for metadata files.
//!
//! Paths handed to a [`StorageBackend`] are object keys relative to the
//! backend root (bucket or directory), e.g. `meta/post-1.toml`.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
