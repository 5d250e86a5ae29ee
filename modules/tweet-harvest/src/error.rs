use std::path::PathBuf;

use recent_search_client::SearchError;
use thiserror::Error;

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Fatal conditions for a run. Dropped records and rejected cursor files are
/// not errors and never show up here.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The search endpoint answered with a non-success status or could not be reached.
    #[error("remote request failed: {0}")]
    Remote(#[from] SearchError),

    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record encoding failed at {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("another run holds the lock at {}", path.display())]
    LockConflict { path: PathBuf },

    #[error("configuration error: {0}")]
    Config(String),
}

impl HarvestError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::Storage {
            path: path.into(),
            source,
        }
    }
}
