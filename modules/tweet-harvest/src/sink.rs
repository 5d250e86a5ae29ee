//! Delimited text store for normalized tweets.
//!
//! Fields are split by `0xFE` and, when needed, quoted with `0xFF`. Neither
//! byte can occur in UTF-8 text, so commas, quotes and the like in tweet bodies
//! pass through untouched.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Deserialize;

use crate::error::{HarvestError, Result};
use crate::normalize::TweetRecord;

pub const FIELD_DELIMITER: u8 = 0xFE;
pub const QUOTE: u8 = 0xFF;

/// How [`RecordSink::append`] opens the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordWriteMode {
    /// Truncate the store on every call; only the latest batch survives.
    #[default]
    Overwrite,
    /// Keep existing rows and add the batch after them.
    Append,
}

#[derive(Debug, Clone)]
pub struct RecordSink {
    path: PathBuf,
    mode: RecordWriteMode,
}

impl RecordSink {
    pub fn new(path: impl Into<PathBuf>, mode: RecordWriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a batch. Despite the name this replaces the file under
    /// [`RecordWriteMode::Overwrite`], so even an empty batch empties the store.
    pub fn append(&self, records: &[TweetRecord]) -> Result<usize> {
        let file = self.open()?;
        let mut writer = WriterBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .quote(QUOTE)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(file);

        for record in records {
            writer
                .write_record([record.id.as_bytes(), record.text.as_bytes()])
                .map_err(|source| HarvestError::Csv {
                    path: self.path.clone(),
                    source,
                })?;
        }
        writer
            .flush()
            .map_err(|e| HarvestError::storage(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), count = records.len(), mode = ?self.mode, "Records written");
        Ok(records.len())
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| HarvestError::storage(parent, e))?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        match self.mode {
            RecordWriteMode::Overwrite => options.write(true).truncate(true),
            RecordWriteMode::Append => options.append(true),
        };
        options
            .open(&self.path)
            .map_err(|e| HarvestError::storage(&self.path, e))
    }
}

/// Read the store back into records. Used to inspect what a run produced.
pub fn read_records(path: &Path) -> Result<Vec<TweetRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .quote(QUOTE)
        .terminator(Terminator::Any(b'\n'))
        .has_headers(false)
        .flexible(false)
        .from_path(path)
        .map_err(|source| HarvestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = row.map_err(|source| HarvestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let field = |i: usize| String::from_utf8_lossy(row.get(i).unwrap_or_default()).into_owned();
        records.push(TweetRecord {
            id: field(0),
            text: field(1),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str) -> TweetRecord {
        TweetRecord {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn writes_raw_delimiter_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("tweets.csv"), RecordWriteMode::Overwrite);
        sink.append(&[record("1", "hello, \"world\"")]).unwrap();

        let bytes = fs::read(sink.path()).unwrap();
        let mut expected = b"1".to_vec();
        expected.push(FIELD_DELIMITER);
        expected.extend_from_slice(b"hello, \"world\"\n");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn newline_in_text_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("tweets.csv"), RecordWriteMode::Overwrite);
        sink.append(&[record("7", "line one\nline two")]).unwrap();

        let bytes = fs::read(sink.path()).unwrap();
        assert_eq!(bytes[2], QUOTE);
        assert_eq!(read_records(sink.path()).unwrap(), vec![record("7", "line one\nline two")]);
    }

    #[test]
    fn overwrite_mode_keeps_only_last_batch() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("tweets.csv"), RecordWriteMode::Overwrite);
        sink.append(&[record("1", "a"), record("2", "b")]).unwrap();
        sink.append(&[record("3", "c")]).unwrap();

        assert_eq!(read_records(sink.path()).unwrap(), vec![record("3", "c")]);
    }

    #[test]
    fn append_mode_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("tweets.csv"), RecordWriteMode::Append);
        sink.append(&[record("1", "a")]).unwrap();
        sink.append(&[record("2", "b")]).unwrap();

        assert_eq!(
            read_records(sink.path()).unwrap(),
            vec![record("1", "a"), record("2", "b")]
        );
    }

    #[test]
    fn unwritable_store_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tweets.csv");
        fs::create_dir(&path).unwrap();
        let sink = RecordSink::new(&path, RecordWriteMode::Overwrite);

        let err = sink.append(&[record("1", "a")]).unwrap_err();
        assert!(matches!(err, HarvestError::Storage { .. }));
    }

    #[test]
    fn empty_batch_truncates_in_overwrite_mode() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("tweets.csv"), RecordWriteMode::Overwrite);
        sink.append(&[record("1", "a")]).unwrap();
        assert_eq!(sink.append(&[]).unwrap(), 0);
        assert!(read_records(sink.path()).unwrap().is_empty());
    }

    #[test]
    fn empty_batch_keeps_rows_in_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("tweets.csv"), RecordWriteMode::Append);
        sink.append(&[record("1", "a")]).unwrap();
        sink.append(&[]).unwrap();
        assert_eq!(read_records(sink.path()).unwrap(), vec![record("1", "a")]);
    }
}
