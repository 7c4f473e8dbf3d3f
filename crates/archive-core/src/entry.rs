use serde::{Deserialize, Serialize};

/// Kind of archived file, serialized as `"photo"` / `"document"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Photo,
    Document,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Document => "document",
        }
    }

    /// Parse a `type` facet value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "photo" => Some(Self::Photo),
            "document" => Some(Self::Document),
            _ => None,
        }
    }
}

/// One record of the persisted index, one per file under the archive root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Base file name including extension
    pub filename: String,
    /// Root-relative public path
    pub url: String,
    /// First path segment under the root
    pub year: String,
    /// Second path segment under the root
    pub month: String,
    /// File size in bytes at build time
    pub size: u64,
    /// Lower-cased extension without the dot
    #[serde(default)]
    pub ext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// An index record plus the facets derived from its filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: ArchiveEntry,
    #[serde(rename = "docYear")]
    pub doc_year: String,
    #[serde(rename = "docDate")]
    pub doc_date: String,
    /// Human-formatted title, also used as a search field
    pub title: String,
}

impl EnrichedEntry {
    pub fn from_entry(entry: ArchiveEntry) -> Self {
        let doc_year = crate::date::parse_document_year(&entry.filename, &entry.year);
        let doc_date =
            crate::date::parse_document_date(&entry.filename, &entry.month, &entry.year);
        let title = crate::query::title::format_title(&entry.filename);
        Self {
            entry,
            doc_year,
            doc_date,
            title,
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.entry.kind
    }

    /// Category shown on the entry; uncategorized documents read as "Document".
    pub fn category_label(&self) -> &str {
        self.entry.category.as_deref().unwrap_or("Document")
    }

    pub fn action_label(&self) -> &'static str {
        match self.entry.kind {
            EntryKind::Photo => "View",
            EntryKind::Document => "Download",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json_shape() {
        let json = r#"{"type":"document","filename":"a.pdf","url":"/archive/2023/04/a.pdf","year":"2023","month":"04","size":10,"ext":"pdf"}"#;
        let entry: ArchiveEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, EntryKind::Document);
        assert_eq!(entry.category, None);

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["type"], "document");
        assert!(back.get("category").is_none());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(EntryKind::parse("photo"), Some(EntryKind::Photo));
        assert_eq!(EntryKind::parse("document"), Some(EntryKind::Document));
        assert_eq!(EntryKind::parse("Photo"), None);
        assert_eq!(EntryKind::parse("all"), None);
    }

    #[test]
    fn test_missing_ext_defaults_to_empty() {
        let json = r#"{"type":"photo","filename":"a","url":"/archive/a","year":"","month":"","size":0}"#;
        let entry: ArchiveEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.ext, "");
    }

    #[test]
    fn test_labels() {
        let entry = ArchiveEntry {
            kind: EntryKind::Document,
            filename: "welcome.pdf".to_string(),
            url: "/archive/2022/01/welcome.pdf".to_string(),
            year: "2022".to_string(),
            month: "01".to_string(),
            size: 1,
            ext: "pdf".to_string(),
            category: None,
        };
        let enriched = EnrichedEntry::from_entry(entry);
        assert_eq!(enriched.category_label(), "Document");
        assert_eq!(enriched.action_label(), "Download");
        assert_eq!(enriched.doc_year, "2022");
        assert_eq!(enriched.doc_date, "January 2022");
    }
}
