//! Pagination cursor and its single-file store.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HarvestError, Result};

/// Length of every continuation token the endpoint has been observed to issue,
/// e.g. `b26v89c19zqg8o3fpe166s4wxylsy1e90x7npkagygsjh`.
pub const CURSOR_LEN: usize = 45;

/// Opaque continuation token issued by the search endpoint.
///
/// Tokens taken from a response are not shape-checked; only what comes back
/// off disk is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Heuristic shape check for a stored token: exactly [`CURSOR_LEN`] ASCII
/// alphanumerics. The endpoint publishes no grammar, so a legitimate token of
/// another length would be rejected here.
pub fn is_cursor_shape(token: &str) -> bool {
    token.len() == CURSOR_LEN && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// How [`CursorStore::save`] writes to the cursor file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorWriteMode {
    /// Append to whatever is already in the file. A second save without a
    /// cleanup leaves two tokens back to back, which `load` rejects, so the
    /// next run starts a fresh walk.
    #[default]
    Append,
    /// Replace the file with the single latest token.
    Overwrite,
}

/// Sole reader and writer of the persisted cursor file.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
    mode: CursorWriteMode,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>, mode: CursorWriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored cursor. A missing or unreadable file, or content that is
    /// not exactly one well-shaped token, yields `None`.
    pub fn load(&self) -> Option<Cursor> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No readable cursor file");
                return None;
            }
        };

        if !is_cursor_shape(&content) {
            warn!(
                path = %self.path.display(),
                len = content.len(),
                "Stored cursor has unexpected shape, starting a fresh walk"
            );
            return None;
        }

        Some(Cursor(content))
    }

    /// Persist `cursor`. `None` and empty tokens are a no-op.
    pub fn save(&self, cursor: Option<&Cursor>) -> Result<()> {
        let Some(cursor) = cursor.filter(|c| !c.is_empty()) else {
            return Ok(());
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| HarvestError::storage(parent, e))?;
        }

        let mut file = match self.mode {
            CursorWriteMode::Append => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path),
            CursorWriteMode::Overwrite => OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path),
        }
        .map_err(|e| HarvestError::storage(&self.path, e))?;

        file.write_all(cursor.as_str().as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| HarvestError::storage(&self.path, e))?;

        info!(path = %self.path.display(), mode = ?self.mode, next_token = %cursor, "Writing next token");
        Ok(())
    }
}
