use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::entry::ArchiveEntry;
use crate::error::IndexError;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "archive-index.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the index as a JSON array.
///
/// The array goes to a sibling temp file first and is renamed into place, so
/// the previous artifact survives any failure.
pub fn write_index(entries: &[ArchiveEntry], path: &Path, pretty: bool) -> Result<(), IndexError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IndexError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let result = write_json(entries, &temp_path, pretty)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| IndexError::io(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result?;

    info!(entries = entries.len(), path = %path.display(), "wrote archive index");
    Ok(())
}

fn write_json(entries: &[ArchiveEntry], path: &Path, pretty: bool) -> Result<(), IndexError> {
    let file = File::create(path).map_err(|e| IndexError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, entries)?;
    } else {
        serde_json::to_writer(&mut writer, entries)?;
    }
    writer.flush().map_err(|e| IndexError::io(path, e))?;
    Ok(())
}

/// Read a persisted index.
pub fn read_index(path: &Path) -> anyhow::Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let entries = serde_json::from_reader(BufReader::new(file))?;
    Ok(entries)
}
