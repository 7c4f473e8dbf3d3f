use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an index build. Nothing is written when one occurs.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("archive root does not exist: {0}")]
    RootMissing(PathBuf),
    #[error("archive root is not a directory: {0}")]
    RootNotDirectory(PathBuf),
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("category map {path} is invalid: {source}")]
    CategoryMap {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize index: {0}")]
    Json(#[from] serde_json::Error),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
