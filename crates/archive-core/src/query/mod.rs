//! Search, facet filtering and year grouping over a loaded archive index.
//!
//! A view is a pure function of `(catalog, query)`: nothing is mutated in
//! place, and rebuilding the view after any change to the query is the only
//! update path.

pub mod title;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::{canonical_category, PHOTOS_CATEGORY};
use crate::entry::{ArchiveEntry, EnrichedEntry, EntryKind};

/// Facet value meaning "no constraint"
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Loaded,
    /// The index could not be fetched or parsed; the catalog is empty.
    Failed(String),
}

/// The loaded index with every entry enriched once.
#[derive(Debug, Clone)]
pub struct ArchiveCatalog {
    entries: Vec<EnrichedEntry>,
    status: LoadStatus,
}

impl ArchiveCatalog {
    pub fn loading() -> Self {
        Self {
            entries: Vec::new(),
            status: LoadStatus::Loading,
        }
    }

    pub fn from_entries(entries: Vec<ArchiveEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(EnrichedEntry::from_entry).collect(),
            status: LoadStatus::Loaded,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(%reason, "archive index unavailable");
        Self {
            entries: Vec::new(),
            status: LoadStatus::Failed(reason),
        }
    }

    /// Settle a load attempt. Errors become an empty, failed catalog.
    pub fn from_result<E: std::fmt::Display>(result: Result<Vec<ArchiveEntry>, E>) -> Self {
        match result {
            Ok(entries) => Self::from_entries(entries),
            Err(e) => Self::failed(e.to_string()),
        }
    }

    pub fn from_json(bytes: &[u8]) -> Self {
        Self::from_result(serde_json::from_slice::<Vec<ArchiveEntry>>(bytes))
    }

    pub fn load(path: &Path) -> Self {
        Self::from_result(
            crate::writer::read_index(path).map_err(|e| format!("{}: {:#}", path.display(), e)),
        )
    }

    pub fn entries(&self) -> &[EnrichedEntry] {
        &self.entries
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Distinct document years, newest first.
    pub fn years(&self) -> Vec<&str> {
        let mut years: Vec<&str> = self.entries.iter().map(|e| e.doc_year.as_str()).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }
}

/// Category facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum CategoryFilter {
    #[default]
    All,
    /// Every photo, whatever its category
    Photos,
    /// Exact match on the entry's category
    Named(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        match value {
            "" | ALL => Self::All,
            PHOTOS_CATEGORY => Self::Photos,
            other => Self::Named(other.to_string()),
        }
    }

    /// Interpret a `?category=` link parameter: case-insensitive against the
    /// known categories, anything unrecognised selects everything.
    pub fn from_query_param(param: Option<&str>) -> Self {
        match param.and_then(canonical_category) {
            Some(name) => Self::parse(name),
            None => Self::All,
        }
    }

    fn matches(&self, entry: &EnrichedEntry) -> bool {
        match self {
            Self::All => true,
            Self::Photos => entry.kind() == EntryKind::Photo,
            Self::Named(name) => entry.entry.category.as_deref() == Some(name.as_str()),
        }
    }
}

/// The four independent query parameters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: CategoryFilter,
}

fn facet(value: &str) -> Option<String> {
    match value {
        "" | ALL => None,
        other => Some(other.to_string()),
    }
}

impl ArchiveQuery {
    /// Build a query from raw selector values, where `"all"` or empty
    /// disables a facet.
    pub fn from_params(search: &str, year: &str, kind: &str, category: &str) -> Self {
        Self {
            search: search.to_string(),
            year: facet(year),
            kind: facet(kind),
            category: CategoryFilter::parse(category),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind.as_str().to_string());
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    fn matches_year(&self, entry: &EnrichedEntry) -> bool {
        self.year.as_deref().map_or(true, |y| entry.doc_year == y)
    }

    fn matches_kind(&self, entry: &EnrichedEntry) -> bool {
        self.kind.as_deref().map_or(true, |k| entry.kind().as_str() == k)
    }

    fn matches_search(&self, entry: &EnrichedEntry) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        entry.entry.filename.to_lowercase().contains(&needle)
            || entry.title.to_lowercase().contains(&needle)
    }

    /// An entry survives only if every active facet accepts it.
    pub fn matches(&self, entry: &EnrichedEntry) -> bool {
        self.matches_year(entry)
            && self.matches_kind(entry)
            && self.category.matches(entry)
            && self.matches_search(entry)
    }
}

/// Entries sharing a document year, in index order.
#[derive(Debug, Clone, Serialize)]
pub struct YearGroup<'a> {
    pub year: &'a str,
    pub count: usize,
    pub entries: Vec<&'a EnrichedEntry>,
}

/// Everything a listing needs to render one state of the archive.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveView<'a> {
    pub total: usize,
    pub filtered: usize,
    pub years: Vec<&'a str>,
    pub groups: Vec<YearGroup<'a>>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<&'a str>,
}

impl ArchiveView<'_> {
    /// True once loading settled and nothing survived the filters.
    pub fn no_matches(&self) -> bool {
        !self.loading && self.filtered == 0
    }
}

pub fn filter_entries<'a>(entries: &'a [EnrichedEntry], query: &ArchiveQuery) -> Vec<&'a EnrichedEntry> {
    entries.iter().filter(|e| query.matches(e)).collect()
}

/// Group by document year, newest year first.
pub fn group_by_year<'a>(entries: &[&'a EnrichedEntry]) -> Vec<YearGroup<'a>> {
    let mut groups: BTreeMap<&'a str, Vec<&'a EnrichedEntry>> = BTreeMap::new();
    for &entry in entries {
        groups.entry(entry.doc_year.as_str()).or_default().push(entry);
    }
    groups
        .into_iter()
        .rev()
        .map(|(year, entries)| YearGroup {
            year,
            count: entries.len(),
            entries,
        })
        .collect()
}

pub fn build_view<'a>(catalog: &'a ArchiveCatalog, query: &ArchiveQuery) -> ArchiveView<'a> {
    let filtered = filter_entries(catalog.entries(), query);
    let groups = group_by_year(&filtered);
    ArchiveView {
        total: catalog.total(),
        filtered: filtered.len(),
        years: catalog.years(),
        groups,
        loading: catalog.is_loading(),
        load_error: match catalog.status() {
            LoadStatus::Failed(reason) => Some(reason.as_str()),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, year: &str, month: &str, filename: &str, category: Option<&str>) -> ArchiveEntry {
        ArchiveEntry {
            kind,
            filename: filename.to_string(),
            url: format!("/archive/{}/{}/{}", year, month, filename),
            year: year.to_string(),
            month: month.to_string(),
            size: 1,
            ext: crate::classify::extension_of(filename),
            category: category.map(str::to_string),
        }
    }

    fn sample() -> ArchiveCatalog {
        ArchiveCatalog::from_entries(vec![
            entry(EntryKind::Document, "2023", "04", "Minutes-04-12-23.pdf", Some("Minutes")),
            entry(EntryKind::Document, "2022", "01", "newsletter.pdf", Some("Newsletter")),
            entry(EntryKind::Photo, "2022", "06", "picnic.jpg", None),
            entry(EntryKind::Photo, "2021", "06", "CCR_2021.jpg", Some("CCR")),
            entry(EntryKind::Document, "2021", "06", "CCR_2021.pdf", Some("CCR")),
            entry(EntryKind::Document, "2024", "01", "Minutes-12-14-23.pdf", Some("Minutes")),
        ])
    }

    fn names(entries: &[&EnrichedEntry]) -> Vec<String> {
        entries.iter().map(|e| e.entry.filename.clone()).collect()
    }

    #[test]
    fn test_grouping_newest_first_with_fallback_year() {
        let catalog = ArchiveCatalog::from_entries(vec![
            entry(EntryKind::Document, "2023", "04", "Minutes-04-12-23.pdf", None),
            entry(EntryKind::Document, "2022", "01", "newsletter.pdf", None),
        ]);
        let view = build_view(&catalog, &ArchiveQuery::default());
        let years: Vec<&str> = view.groups.iter().map(|g| g.year).collect();
        assert_eq!(years, vec!["2023", "2022"]);
        assert_eq!(view.groups[0].entries[0].entry.filename, "Minutes-04-12-23.pdf");
        assert_eq!(view.groups[1].entries[0].entry.filename, "newsletter.pdf");
        assert_eq!(view.groups[1].entries[0].doc_date, "January 2022");
    }

    #[test]
    fn test_groups_keep_index_order() {
        let catalog = sample();
        let view = build_view(&catalog, &ArchiveQuery::default());
        // Minutes-12-14-23 sits in a 2024 folder but documents 2023
        let g2023 = view.groups.iter().find(|g| g.year == "2023").unwrap();
        assert_eq!(
            names(&g2023.entries),
            vec!["Minutes-04-12-23.pdf", "Minutes-12-14-23.pdf"]
        );
        assert_eq!(g2023.count, 2);
        assert_eq!(view.total, 6);
        assert_eq!(view.filtered, 6);
        assert_eq!(view.years, vec!["2023", "2022", "2021"]);
    }

    #[test]
    fn test_photos_pseudo_category() {
        let catalog = sample();
        let q = ArchiveQuery::default().with_category(CategoryFilter::Photos);
        let got = filter_entries(catalog.entries(), &q);
        assert_eq!(names(&got), vec!["picnic.jpg", "CCR_2021.jpg"]);
        assert!(got.iter().all(|e| e.kind() == EntryKind::Photo));
    }

    #[test]
    fn test_named_category_is_exact() {
        let catalog = sample();
        let q = ArchiveQuery::default().with_category(CategoryFilter::Named("CCR".into()));
        assert_eq!(filter_entries(catalog.entries(), &q).len(), 2);
        let q = ArchiveQuery::default().with_category(CategoryFilter::Named("ccr".into()));
        assert!(filter_entries(catalog.entries(), &q).is_empty());
    }

    #[test]
    fn test_search_matches_filename_or_title() {
        let catalog = sample();
        let q = ArchiveQuery::default().with_search("minutes");
        assert_eq!(filter_entries(catalog.entries(), &q).len(), 2);

        // Only the formatted title has spaces
        let q = ArchiveQuery::default().with_search("minutes 04 12");
        assert_eq!(names(&filter_entries(catalog.entries(), &q)), vec!["Minutes-04-12-23.pdf"]);

        let q = ArchiveQuery::default().with_search("MINUTES-04");
        assert_eq!(filter_entries(catalog.entries(), &q).len(), 1);
    }

    #[test]
    fn test_non_matching_search_leaves_other_facets_alone() {
        let catalog = sample();
        let q = ArchiveQuery::default().with_year("2021").with_search("zzz");
        let view = build_view(&catalog, &q);
        assert_eq!(view.filtered, 0);
        assert!(view.groups.is_empty());
        assert!(view.no_matches());

        let q = q.with_search("");
        assert_eq!(build_view(&catalog, &q).filtered, 2);
    }

    #[test]
    fn test_facets_commute_and_are_idempotent() {
        let catalog = sample();
        let singles = [
            ArchiveQuery::default().with_year("2023"),
            ArchiveQuery::default().with_kind(EntryKind::Document),
            ArchiveQuery::default().with_category(CategoryFilter::Named("Minutes".into())),
            ArchiveQuery::default().with_search("12"),
        ];
        let combined = ArchiveQuery::from_params("12", "2023", "document", "Minutes");
        let expected = names(&filter_entries(catalog.entries(), &combined));
        assert_eq!(expected, vec!["Minutes-04-12-23.pdf", "Minutes-12-14-23.pdf"]);

        let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];
        for order in orders {
            let mut survivors: Vec<&EnrichedEntry> = catalog.entries().iter().collect();
            for i in order {
                survivors.retain(|e| singles[i].matches(e));
            }
            assert_eq!(names(&survivors), expected, "order {:?}", order);
        }

        let once = filter_entries(catalog.entries(), &combined);
        let twice: Vec<&EnrichedEntry> = once.iter().copied().filter(|e| combined.matches(e)).collect();
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn test_from_params_all_and_empty() {
        let q = ArchiveQuery::from_params("", "all", "", "all");
        assert_eq!(q, ArchiveQuery::default());
        let q = ArchiveQuery::from_params("x", "2021", "photo", "Photos");
        assert_eq!(q.year.as_deref(), Some("2021"));
        assert_eq!(q.kind.as_deref(), Some("photo"));
        assert_eq!(q.category, CategoryFilter::Photos);
    }

    #[test]
    fn test_unknown_type_matches_nothing() {
        let catalog = sample();
        let q = ArchiveQuery::from_params("", "all", "video", "all");
        assert!(filter_entries(catalog.entries(), &q).is_empty());
    }

    #[test]
    fn test_category_query_param() {
        assert_eq!(
            CategoryFilter::from_query_param(Some("minutes")),
            CategoryFilter::Named("Minutes".into())
        );
        assert_eq!(CategoryFilter::from_query_param(Some("photos")), CategoryFilter::Photos);
        assert_eq!(CategoryFilter::from_query_param(Some("recipes")), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_query_param(None), CategoryFilter::All);
    }

    #[test]
    fn test_failed_load_is_empty_and_ready() {
        let catalog = ArchiveCatalog::from_result::<String>(Err("network error".to_string()));
        let view = build_view(&catalog, &ArchiveQuery::default().with_search("minutes"));
        assert_eq!(view.total, 0);
        assert!(view.groups.is_empty());
        assert!(!view.loading);
        assert_eq!(view.load_error, Some("network error"));
        assert!(view.no_matches());
    }

    #[test]
    fn test_malformed_json_degrades() {
        let catalog = ArchiveCatalog::from_json(b"{\"not\": \"an array\"}");
        assert!(matches!(catalog.status(), LoadStatus::Failed(_)));
        assert_eq!(catalog.total(), 0);
    }

    #[test]
    fn test_missing_file_degrades() {
        let catalog = ArchiveCatalog::load(Path::new("/nonexistent/archive-index.json"));
        assert!(matches!(catalog.status(), LoadStatus::Failed(_)));
        assert!(build_view(&catalog, &ArchiveQuery::default()).groups.is_empty());
    }

    #[test]
    fn test_loading_state_is_not_no_matches() {
        let catalog = ArchiveCatalog::loading();
        let view = build_view(&catalog, &ArchiveQuery::default());
        assert!(view.loading);
        assert!(!view.no_matches());
    }
}
