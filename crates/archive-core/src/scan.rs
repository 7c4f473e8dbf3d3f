use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::categories::CategoryMap;
use crate::classify;
use crate::entry::{ArchiveEntry, EntryKind};
use crate::error::IndexError;
use crate::ThrottledProgress;

/// A regular file found under the archive root
#[derive(Debug, Clone)]
pub struct FoundFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Recursively collect every non-hidden file under `root`, depth-first,
/// visiting children in name order. Any unreadable directory aborts the walk.
pub fn collect_files(root: &Path) -> Result<Vec<FoundFile>, IndexError> {
    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IndexError::RootMissing(root.to_path_buf()),
        _ => IndexError::io(root, e),
    })?;
    if !meta.is_dir() {
        return Err(IndexError::RootNotDirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    collect_files_recursive(root, &mut files)?;
    Ok(files)
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<FoundFile>) -> Result<(), IndexError> {
    let mut children: Vec<_> = fs::read_dir(dir)
        .map_err(|e| IndexError::io(dir, e))?
        .collect::<Result<_, _>>()
        .map_err(|e| IndexError::io(dir, e))?;
    children.sort_by_key(|e| e.file_name());

    for child in children {
        let name = child.file_name();
        if name.to_string_lossy().starts_with('.') {
            debug!(path = %child.path().display(), "skipping hidden entry");
            continue;
        }

        let path = child.path();
        // Follows symlinks, like a plain stat
        let meta = fs::metadata(&path).map_err(|e| IndexError::io(&path, e))?;
        if meta.is_dir() {
            collect_files_recursive(&path, files)?;
        } else {
            files.push(FoundFile {
                path,
                size: meta.len(),
            });
        }
    }
    Ok(())
}

/// Root-relative path with `/` separators, NFC-normalised.
pub fn relative_url_path(root: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().nfc().collect()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// Turn a found file into its index record.
///
/// Only directory segments count towards `year`/`month`; a file sitting
/// directly under the root has neither.
pub fn build_entry(
    root: &Path,
    file: &FoundFile,
    url_prefix: &str,
    categories: &CategoryMap,
) -> ArchiveEntry {
    let rel = relative_url_path(root, &file.path);
    let mut segments: Vec<&str> = rel.split('/').collect();
    let filename = segments.pop().unwrap_or("").to_string();
    let year = segments.first().copied().unwrap_or("").to_string();
    let month = segments.get(1).copied().unwrap_or("").to_string();

    let kind = classify::classify_path(&rel);
    let category = match kind {
        EntryKind::Document => categories.lookup(&rel, &filename).map(str::to_string),
        EntryKind::Photo => None,
    };

    ArchiveEntry {
        kind,
        ext: classify::extension_of(&filename),
        url: format!("{}/{}", url_prefix.trim_end_matches('/'), rel),
        filename,
        year,
        month,
        size: file.size,
        category,
    }
}

/// Walk the archive root and build one record per file.
pub fn scan_archive(
    root: &Path,
    url_prefix: &str,
    categories: &CategoryMap,
    progress: &ThrottledProgress,
) -> Result<Vec<ArchiveEntry>, IndexError> {
    progress.report("scan", 0, 1, &format!("Scanning {}", root.display()));
    let files = collect_files(root)?;
    let total = files.len() as u64;
    debug!(files = files.len(), "archive walk finished");

    let mut entries = Vec::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        progress.report("index", i as u64, total, "Indexing files");
        entries.push(build_entry(root, file, url_prefix, categories));
    }
    Ok(entries)
}
