use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use recent_search_client::SearchClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tweet_harvest::config::{load_config, AppConfig, FileConfig};
use tweet_harvest::Harvester;

#[derive(Parser)]
#[command(name = "tweet-harvest", about = "Resumable recent-search harvester")]
struct Cli {
    /// Path to config TOML file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pages to fetch this run, overriding the config file
    #[arg(long)]
    pages: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = run().await {
        tracing::error!(error = %e, "Harvest failed");
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    // Initialize logging; LOG_FORMAT=json for scheduler-friendly output
    let filter = EnvFilter::from_default_env().add_directive("tweet_harvest=info".parse()?);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => {
            info!(config = %path.display(), "Loading config");
            load_config(path)?
        }
        None => FileConfig::default(),
    };
    let app_config = AppConfig::from_env()?;

    let pages = cli.pages.unwrap_or(file_config.pages);
    let data_dir = file_config.data_dir();
    info!(data_dir = %data_dir.display(), pages, "Tweet harvest starting");

    let client = SearchClient::with_endpoint(&file_config.endpoint, app_config.bearer_token);
    let harvester = Harvester::in_dir(Box::new(client), &file_config, &data_dir);
    let stats = harvester.run(pages).await?;

    info!("Harvest complete. {stats}");
    Ok(())
}
