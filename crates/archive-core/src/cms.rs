//! Shapes returned by the content store and the listings built from them.
//! Fetching is done elsewhere; these functions only arrange records.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Document categories in the order the documents page lists them
pub const DOCUMENT_CATEGORY_ORDER: &[&str] = &[
    "Water Quality Reports",
    "Meeting Minutes",
    "Financial Reports",
    "Rules & Regulations",
    "Forms",
    "Notices",
    "Other",
];

const UNCATEGORIZED: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    pub file_url: String,
    #[serde(default)]
    pub file_type: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl CmsDocument {
    pub fn category(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Year the document is filed under: its own `year` when set and
    /// non-zero, else the UTC year it was published.
    pub fn filing_year(&self) -> i32 {
        self.year
            .filter(|y| *y != 0)
            .unwrap_or_else(|| self.published_at.year())
    }

    /// Label for the file-type chip, `PDF` when the store omits it.
    pub fn file_type_label(&self) -> String {
        self.file_type.as_deref().unwrap_or("pdf").to_uppercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsUpdate {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    pub published_at: DateTime<Utc>,
    pub category: String,
    #[serde(default)]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySection<'a> {
    pub category: &'a str,
    pub anchor: String,
    pub documents: Vec<&'a CmsDocument>,
    /// The same documents split by filing year, newest first
    pub years: Vec<(i32, Vec<&'a CmsDocument>)>,
}

/// In-page anchor for a category heading: every whitespace run, leading
/// and trailing ones included, becomes a single `-`.
pub fn category_anchor(category: &str) -> String {
    WHITESPACE_RE.replace_all(category, "-").to_lowercase()
}

/// Group documents by category. Known categories come first in their fixed
/// order; unknown ones follow in the order they were first seen.
pub fn group_documents_by_category(docs: &[CmsDocument]) -> Vec<CategorySection<'_>> {
    let mut seen: Vec<&str> = Vec::new();
    let mut by_category: BTreeMap<&str, Vec<&CmsDocument>> = BTreeMap::new();
    for doc in docs {
        let cat = doc.category();
        if !by_category.contains_key(cat) {
            seen.push(cat);
        }
        by_category.entry(cat).or_default().push(doc);
    }

    let ordered = DOCUMENT_CATEGORY_ORDER
        .iter()
        .copied()
        .filter(|c| by_category.contains_key(c))
        .chain(
            seen.into_iter()
                .filter(|c| !DOCUMENT_CATEGORY_ORDER.contains(c)),
        )
        .collect::<Vec<_>>();

    ordered
        .into_iter()
        .filter_map(|cat| {
            let documents = by_category.remove(cat)?;
            Some(CategorySection {
                category: cat,
                anchor: category_anchor(cat),
                years: group_documents_by_year(&documents),
                documents,
            })
        })
        .collect()
}

fn group_documents_by_year<'a>(docs: &[&'a CmsDocument]) -> Vec<(i32, Vec<&'a CmsDocument>)> {
    let mut by_year: BTreeMap<i32, Vec<&CmsDocument>> = BTreeMap::new();
    for &doc in docs {
        by_year.entry(doc.filing_year()).or_default().push(doc);
    }
    by_year.into_iter().rev().collect()
}

/// Group updates by publication year, newest year first.
pub fn group_updates_by_year(updates: &[CmsUpdate]) -> Vec<(i32, Vec<&CmsUpdate>)> {
    let mut by_year: BTreeMap<i32, Vec<&CmsUpdate>> = BTreeMap::new();
    for update in updates {
        by_year.entry(update.published_at.year()).or_default().push(update);
    }
    by_year.into_iter().rev().collect()
}
