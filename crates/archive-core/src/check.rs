use std::collections::BTreeMap;

use serde::Serialize;

use crate::entry::ArchiveEntry;

/// Differences between a persisted index and the tree it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StalenessReport {
    /// On disk, missing from the index
    pub added: Vec<String>,
    /// In the index, gone from disk
    pub removed: Vec<String>,
    /// Present in both with different size, type or category
    pub changed: Vec<String>,
}

impl StalenessReport {
    pub fn is_stale(&self) -> bool {
        !(self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty())
    }
}

/// Compare records by URL. Output lists are sorted by URL.
pub fn compare_indexes(persisted: &[ArchiveEntry], current: &[ArchiveEntry]) -> StalenessReport {
    let old: BTreeMap<&str, &ArchiveEntry> = persisted.iter().map(|e| (e.url.as_str(), e)).collect();
    let new: BTreeMap<&str, &ArchiveEntry> = current.iter().map(|e| (e.url.as_str(), e)).collect();

    let mut report = StalenessReport::default();
    for (url, entry) in &new {
        match old.get(url) {
            None => report.added.push(url.to_string()),
            Some(prev) if prev != entry => report.changed.push(url.to_string()),
            Some(_) => {}
        }
    }
    report.removed = old
        .keys()
        .filter(|url| !new.contains_key(*url))
        .map(|url| url.to_string())
        .collect();
    report
}
