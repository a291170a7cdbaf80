//! Metadata files and where they live.
//!
//! Every published entry is described by a small TOML document stored at
//! `meta/<fileName>.toml`:
//!
//! ```toml
//! category = "tech"
//! tag = ["rust", "aws"]
//! title = "Hello"
//! ```
//!
//! The `fileName` is never written inside the document; it is the object key
//! with the [`KeyLayout`] prefix and suffix removed.

pub mod error;
mod layout;
mod metadata;

pub use crate::layout::KeyLayout;
pub use crate::metadata::MetadataFile;
