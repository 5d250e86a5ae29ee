//! One run: load cursor, walk a bounded number of pages, persist the last cursor.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{FileConfig, CURSOR_FILE, LOCK_FILE, TWEETS_FILE};
use crate::cursor::{Cursor, CursorStore};
use crate::error::Result;
use crate::lock::RunLock;
use crate::normalize::{extract_next_cursor, extract_records};
use crate::query::SearchQuery;
use crate::sink::RecordSink;
use crate::traits::SearchBackend;

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub pages_fetched: u32,
    /// Records handed to the sink over all pages. Under
    /// `RecordWriteMode::Overwrite` only the last page's batch stays on disk.
    pub records_emitted: usize,
    pub records_dropped: usize,
    /// Cursor handed to the store at the end of the run, if any was known.
    pub cursor: Option<Cursor>,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pages={} emitted={} dropped={} cursor={}",
            self.pages_fetched,
            self.records_emitted,
            self.records_dropped,
            self.cursor.as_ref().map_or("<none>", Cursor::as_str)
        )
    }
}

pub struct Harvester {
    backend: Box<dyn SearchBackend>,
    base_query: SearchQuery,
    cursors: CursorStore,
    sink: RecordSink,
    lock_path: Option<PathBuf>,
}

impl Harvester {
    pub fn new(
        backend: Box<dyn SearchBackend>,
        base_query: SearchQuery,
        cursors: CursorStore,
        sink: RecordSink,
    ) -> Self {
        Self {
            backend,
            base_query,
            cursors,
            sink,
            lock_path: None,
        }
    }

    /// Wire up store, sink and lock under `data_dir`.
    pub fn in_dir(backend: Box<dyn SearchBackend>, config: &FileConfig, data_dir: &Path) -> Self {
        let harvester = Self::new(
            backend,
            config.base_query(),
            CursorStore::new(data_dir.join(CURSOR_FILE), config.cursor_write),
            RecordSink::new(data_dir.join(TWEETS_FILE), config.record_write),
        );
        if config.lock {
            harvester.with_lock(data_dir.join(LOCK_FILE))
        } else {
            harvester
        }
    }

    /// Hold a lock file at `path` for the duration of each run.
    pub fn with_lock(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_path = Some(path.into());
        self
    }

    /// Fetch `pages` pages, writing each page's records, then persist the last
    /// cursor seen. Any fetch or storage failure aborts before the cursor is
    /// persisted, so a failed run never advances the stored position.
    pub async fn run(&self, pages: u32) -> Result<RunStats> {
        let _lock = self
            .lock_path
            .as_ref()
            .map(|path| RunLock::acquire(path.clone()))
            .transpose()?;

        let stored = self.cursors.load();
        match &stored {
            Some(cursor) => info!(next_token = %cursor, "Resuming walk from stored cursor"),
            None => info!("No stored cursor, starting a fresh walk"),
        }

        let mut last_cursor = stored.clone();
        let mut query = self.base_query.clone().with_cursor(stored);
        let mut stats = RunStats::default();

        for page in 0..pages {
            let response = self.backend.search(&query).await?;

            let extracted = extract_records(&response);
            if !extracted.is_empty_page() {
                stats.records_emitted += self.sink.append(&extracted.records)?;
            }
            stats.records_dropped += extracted.dropped;
            stats.pages_fetched += 1;

            let next = extract_next_cursor(&response);
            info!(
                page,
                kept = extracted.records.len(),
                dropped = extracted.dropped,
                has_next = next.is_some(),
                "Page harvested"
            );

            if let Some(cursor) = next.as_ref().filter(|c| !c.is_empty()) {
                last_cursor = Some(cursor.clone());
            }
            query = query.with_cursor(next);
        }

        self.cursors.save(last_cursor.as_ref())?;
        stats.cursor = last_cursor;
        Ok(stats)
    }
}
