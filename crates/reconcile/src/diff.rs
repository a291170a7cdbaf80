use std::collections::BTreeSet;

/// Outcome of comparing the storage listing with the catalog.
///
/// Every identifier lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// In storage, not in the catalog.
    pub to_create: BTreeSet<String>,
    /// In both.
    pub to_update: BTreeSet<String>,
    /// In the catalog, no longer in storage.
    pub to_delete: BTreeSet<String>,
}

impl Diff {
    /// Every identifier present in storage, in sorted order.
    pub fn to_create_or_update(&self) -> impl Iterator<Item = &str> + '_ {
        self.to_create.union(&self.to_update).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Compare storage identifiers with catalog identifiers.
///
/// Inputs are collapsed into sets first; duplicates within either side
/// never change the result.
pub fn diff(
    storage: impl IntoIterator<Item = impl Into<String>>,
    catalog: impl IntoIterator<Item = impl Into<String>>,
) -> Diff {
    let storage: BTreeSet<String> = storage.into_iter().map(Into::into).collect();
    let mut catalog: BTreeSet<String> = catalog.into_iter().map(Into::into).collect();
    let mut result = Diff::default();
    for id in storage {
        if catalog.remove(&id) {
            result.to_update.insert(id);
        } else {
            result.to_create.insert(id);
        }
    }
    result.to_delete = catalog;
    result
}
