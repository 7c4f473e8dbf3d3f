use crate::entry::EntryKind;

/// Folder names that mark their contents as photos
const PHOTO_FOLDERS: &[&str] = &["photos", "photo"];

/// Folder names that mark their contents as documents
const DOCUMENT_FOLDERS: &[&str] = &["documents", "docs"];

/// Categories offered by the archive filter, in display order.
pub const ARCHIVE_CATEGORIES: &[&str] = &[
    "Minutes",
    "CCR",
    "Financial",
    "Newsletter",
    "Policy",
    "History",
    "Bylaws",
];

/// Pseudo-category that selects every photo regardless of its category
pub const PHOTOS_CATEGORY: &str = "Photos";

/// Classify a file from its root-relative path.
///
/// A `photos`/`documents` folder anywhere above the file decides; otherwise
/// image MIME types are photos and everything else is a document.
pub fn classify_path(rel_path: &str) -> EntryKind {
    let mut segments: Vec<&str> = rel_path.split('/').collect();
    let filename = segments.pop().unwrap_or("");

    for segment in segments.iter().rev() {
        let lower = segment.to_lowercase();
        if PHOTO_FOLDERS.contains(&lower.as_str()) {
            return EntryKind::Photo;
        }
        if DOCUMENT_FOLDERS.contains(&lower.as_str()) {
            return EntryKind::Document;
        }
    }

    classify_extension(filename)
}

/// Classify a file by its name alone.
pub fn classify_extension(filename: &str) -> EntryKind {
    match mime_guess::from_path(filename).first() {
        Some(mime) if mime.type_() == mime_guess::mime::IMAGE => EntryKind::Photo,
        _ => EntryKind::Document,
    }
}

/// Lower-cased extension without the leading dot; empty when there is none.
pub fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Resolve a user-supplied category name (any case) to a known category.
pub fn canonical_category(name: &str) -> Option<&'static str> {
    ARCHIVE_CATEGORIES
        .iter()
        .chain(std::iter::once(&PHOTOS_CATEGORY))
        .find(|c| c.eq_ignore_ascii_case(name))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_decides_over_extension() {
        assert_eq!(classify_path("2023/04/photos/scan.pdf"), EntryKind::Photo);
        assert_eq!(classify_path("2023/04/Documents/site-map.png"), EntryKind::Document);
    }

    #[test]
    fn test_nearest_folder_wins() {
        assert_eq!(classify_path("photos/2023/docs/plan.jpg"), EntryKind::Document);
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(classify_path("2023/04/picnic.JPG"), EntryKind::Photo);
        assert_eq!(classify_path("2023/04/picnic.gif"), EntryKind::Photo);
        assert_eq!(classify_path("2023/04/Minutes-04-12-23.pdf"), EntryKind::Document);
        assert_eq!(classify_path("README"), EntryKind::Document);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Minutes.PDF"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("noext"), "");
    }

    #[test]
    fn test_canonical_category() {
        assert_eq!(canonical_category("minutes"), Some("Minutes"));
        assert_eq!(canonical_category("ccr"), Some("CCR"));
        assert_eq!(canonical_category("PHOTOS"), Some("Photos"));
        assert_eq!(canonical_category("Recipes"), None);
    }
}
