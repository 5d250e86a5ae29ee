use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cursor::CursorWriteMode;
use crate::error::HarvestError;
use crate::query::{SearchQuery, DEFAULT_MAX_RESULTS, DEFAULT_QUERY};
use crate::sink::RecordWriteMode;

pub const TWEETS_FILE: &str = "tweets.csv";
pub const CURSOR_FILE: &str = "next_token.txt";
pub const LOCK_FILE: &str = "harvest.lock";

/// Secrets, loaded from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bearer_token: String,
}

impl AppConfig {
    pub fn from_env() -> std::result::Result<Self, HarvestError> {
        dotenvy::dotenv().ok();

        let bearer_token = std::env::var("BEARER_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                HarvestError::Config("BEARER_TOKEN environment variable is required".to_string())
            })?;

        let config = Self { bearer_token };
        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        let preview: String = self.bearer_token.chars().take(5).collect();
        tracing::info!("Config loaded:");
        tracing::info!(
            "  BEARER_TOKEN: {}...({} chars)",
            preview,
            self.bearer_token.len()
        );
    }
}

/// Non-secret settings from an optional TOML file. Every field has a default,
/// so an absent file behaves like an empty one.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: String,
    pub query: String,
    pub max_results: u32,
    /// Pages fetched per run.
    pub pages: u32,
    /// Directory holding the store, cursor and lock files. Defaults to
    /// `tweets/` beside the executable.
    pub data_dir: Option<PathBuf>,
    pub cursor_write: CursorWriteMode,
    pub record_write: RecordWriteMode,
    pub lock: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            endpoint: recent_search_client::RECENT_SEARCH_URL.to_string(),
            query: DEFAULT_QUERY.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            pages: 1,
            data_dir: None,
            cursor_write: CursorWriteMode::default(),
            record_write: RecordWriteMode::default(),
            lock: true,
        }
    }
}

impl FileConfig {
    pub fn base_query(&self) -> SearchQuery {
        SearchQuery::new(self.query.clone(), self.max_results)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// `tweets/` next to the running executable, or relative to the working
/// directory if the executable path cannot be resolved.
pub fn default_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(|dir| dir.join("tweets")))
        .unwrap_or_else(|| PathBuf::from("tweets"))
}
