//! Object key validation.
//!
//! Keys arrive from object listings, S3 event notifications and the command
//! line. Before a key touches a backend it is normalised here so that the
//! local backend can never be walked out of its root directory.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalises an object key.
///
/// `.` components and duplicate separators disappear, `..` is resolved
/// against the preceding component and rejected when it would leave the
/// root. Null bytes, platform prefixes and keys that normalise to nothing
/// are rejected with [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sublog_storage::validate_path;
/// assert_eq!(validate_path("meta//post-1.toml").unwrap(), Path::new("meta/post-1.toml"));
/// assert_eq!(validate_path("/meta/./post-1.toml").unwrap(), Path::new("meta/post-1.toml"));
/// assert!(validate_path("../meta/post-1.toml").is_err());
/// assert!(validate_path("meta/\0.toml").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but
                // truncate in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}
