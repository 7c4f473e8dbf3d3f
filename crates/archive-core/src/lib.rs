pub mod categories;
pub mod check;
pub mod classify;
pub mod cms;
pub mod date;
pub mod entry;
pub mod error;
pub mod payment;
pub mod query;
pub mod scan;
pub mod writer;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use categories::CategoryMap;
pub use check::StalenessReport;
pub use entry::{ArchiveEntry, EnrichedEntry, EntryKind};
pub use error::IndexError;
pub use query::{build_view, ArchiveCatalog, ArchiveQuery, ArchiveView, CategoryFilter, LoadStatus};

fn default_url_prefix() -> String {
    "/archive".to_string()
}

fn default_pretty() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Archive root, laid out as `<year>/<month>/<file>`
    pub root: PathBuf,
    /// Where the JSON index is written
    pub output: PathBuf,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// Optional JSON sidecar of category assignments
    #[serde(default)]
    pub categories: Option<PathBuf>,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl IndexOptions {
    pub fn new(root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: output.into(),
            url_prefix: default_url_prefix(),
            categories: None,
            pretty: default_pretty(),
        }
    }

    fn load_categories(&self) -> Result<CategoryMap, IndexError> {
        match &self.categories {
            Some(path) => {
                let map = CategoryMap::load(path)?;
                if map.is_empty() {
                    warn!(path = %path.display(), "category map has no entries");
                } else {
                    info!(path = %path.display(), entries = map.len(), "loaded category map");
                }
                Ok(map)
            }
            None => Ok(CategoryMap::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResult {
    pub entries: u64,
    pub photos: u64,
    pub documents: u64,
    pub total_bytes: u64,
}

impl IndexResult {
    fn from_entries(entries: &[ArchiveEntry]) -> Self {
        let photos = entries.iter().filter(|e| e.kind == EntryKind::Photo).count() as u64;
        Self {
            entries: entries.len() as u64,
            photos,
            documents: entries.len() as u64 - photos,
            total_bytes: entries.iter().map(|e| e.size).sum(),
        }
    }
}

/// Type alias for progress callback
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

/// Throttled progress reporter. Emits at most every 200ms, and always on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback<'a>,
    last_emit: std::sync::Mutex<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback<'a>) -> Self {
        Self {
            inner,
            last_emit: std::sync::Mutex::new(
                Instant::now()
                    .checked_sub(std::time::Duration::from_secs(1))
                    .unwrap_or_else(Instant::now),
            ),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            let mut last = match self.last_emit.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if last.elapsed().as_millis() < 200 {
                return;
            }
            *last = Instant::now();
        }
        (self.inner)(stage, current, total, message);
    }
}

/// Scan the archive root without writing anything.
pub fn scan_index(
    options: &IndexOptions,
    progress: &ThrottledProgress,
) -> Result<Vec<ArchiveEntry>, IndexError> {
    let categories = options.load_categories()?;
    scan::scan_archive(&options.root, &options.url_prefix, &categories, progress)
}

/// Build the index and persist it. Fails before writing if the root or the
/// category map cannot be read.
pub fn build_index(
    options: &IndexOptions,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<IndexResult> {
    let tp = ThrottledProgress::new(progress_callback);

    let entries = scan_index(options, &tp)
        .with_context(|| format!("failed to index {}", options.root.display()))?;

    tp.report("write", 0, 1, "Writing index");
    writer::write_index(&entries, &options.output, options.pretty)?;

    let result = IndexResult::from_entries(&entries);
    info!(
        entries = result.entries,
        photos = result.photos,
        documents = result.documents,
        "archive index built"
    );
    Ok(result)
}

/// Compare the persisted index against the current tree. A missing artifact
/// counts as empty, so every file shows up as added.
pub fn check_index(
    options: &IndexOptions,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<StalenessReport> {
    let tp = ThrottledProgress::new(progress_callback);
    let current = scan_index(options, &tp)
        .with_context(|| format!("failed to index {}", options.root.display()))?;

    let persisted = if options.output.exists() {
        writer::read_index(&options.output)
            .with_context(|| format!("failed to read {}", options.output.display()))?
    } else {
        Vec::new()
    };

    Ok(check::compare_indexes(&persisted, &current))
}
