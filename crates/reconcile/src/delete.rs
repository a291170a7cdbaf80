use sublog_catalog::CatalogRecord;

/// Pick the record to delete for a removed metadata file.
///
/// Records are matched by `fileName` beforehand; duplicates are not
/// repaired, the first match wins.
pub fn resolve_deletion(matches: &[CatalogRecord]) -> Option<&str> {
    matches.first().map(|record| record.id.as_str())
}

/// What a delete flow did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// No record carried the `fileName`; nothing was deleted.
    NoMatch,
    /// The record with this `id` was deleted.
    Deleted { id: String },
}
