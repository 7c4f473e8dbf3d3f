use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::IndexError;

/// Out-of-band category assignments, read from a JSON object whose keys are
/// either root-relative paths (`2023/04/Minutes-04-12-23.pdf`) or bare
/// filenames.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    entries: BTreeMap<String, String>,
}

impl CategoryMap {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let bytes = fs::read(path).map_err(|e| IndexError::io(path, e))?;
        let entries: BTreeMap<String, String> =
            serde_json::from_slice(&bytes).map_err(|source| IndexError::CategoryMap {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(entries))
    }

    /// Category for a file. A path key beats a filename key.
    pub fn lookup(&self, rel_path: &str, filename: &str) -> Option<&str> {
        self.entries
            .get(rel_path)
            .or_else(|| self.entries.get(filename))
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
