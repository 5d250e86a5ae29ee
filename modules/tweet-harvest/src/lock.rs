//! Single-run lock file, so two scheduled runs never share a starting cursor.
//!
//! The lock file holds three lines: start time (RFC 3339), pid, and a per-run
//! id. It only ever appears fully written: the stamp goes to a temp file that
//! is then hard-linked into place, which fails if a lock already exists.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{HarvestError, Result};

/// Locks older than this are assumed to belong to a killed run.
pub const STALE_AFTER_MINUTES: i64 = 30;

/// Held for the duration of a run. On drop the file is removed, but only if
/// it still carries this run's id.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    id: Uuid,
}

impl RunLock {
    /// Fails with [`HarvestError::LockConflict`] when a live lock already
    /// exists. A stale lock is taken over.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HarvestError::storage(parent, e))?;
        }

        let id = Uuid::new_v4();
        let stamp = format!("{}\n{}\n{}\n", Utc::now().to_rfc3339(), std::process::id(), id);

        let mut tmp = path.clone().into_os_string();
        tmp.push(format!(".{id}.tmp"));
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, &stamp).map_err(|e| HarvestError::storage(&tmp, e))?;

        let linked = link_or_take_over(&tmp, &path);
        let _ = fs::remove_file(&tmp);
        linked?;

        info!(path = %path.display(), %id, "Run lock acquired");
        Ok(Self { path, id })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        match fs::read_to_string(&self.path) {
            Ok(content) if lock_id(&content) == Some(self.id) => {
                if let Err(e) = fs::remove_file(&self.path) {
                    warn!(path = %self.path.display(), error = %e, "Failed to release run lock");
                }
            }
            Ok(_) => {
                warn!(path = %self.path.display(), id = %self.id, "Run lock was taken over, leaving it in place");
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Run lock missing at release");
            }
        }
    }
}

fn link_or_take_over(tmp: &Path, path: &Path) -> Result<()> {
    match fs::hard_link(tmp, path) {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => return Err(HarvestError::storage(path, e)),
    }

    let Some(existing) = stale_content(path, Utc::now()) else {
        return Err(HarvestError::LockConflict {
            path: path.to_path_buf(),
        });
    };

    // Only remove what was judged stale; a lock replaced in between stays.
    if fs::read_to_string(path).ok().as_deref() == Some(existing.as_str()) {
        warn!(path = %path.display(), "Removing stale run lock");
        let _ = fs::remove_file(path);
    }

    match fs::hard_link(tmp, path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(HarvestError::LockConflict {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(HarvestError::storage(path, e)),
    }
}

/// Content of the lock at `path` if it belongs to a dead run. A readable
/// stamp is judged by its start time; anything else by the file's mtime.
fn stale_content(path: &Path, now: DateTime<Utc>) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;

    let started_at = content
        .lines()
        .next()
        .and_then(|line| DateTime::parse_from_rfc3339(line.trim()).ok())
        .map(|t| t.with_timezone(&Utc));

    let stale = match started_at {
        Some(t) => now - t > Duration::minutes(STALE_AFTER_MINUTES),
        None => {
            let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
            let age = SystemTime::now().duration_since(modified).unwrap_or_default();
            Duration::from_std(age).is_ok_and(|age| age > Duration::minutes(STALE_AFTER_MINUTES))
        }
    };

    stale.then_some(content)
}

fn lock_id(content: &str) -> Option<Uuid> {
    content.lines().nth(2).and_then(|line| line.trim().parse().ok())
}
