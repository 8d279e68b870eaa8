use anyhow::{Context, Result};
use clap::Parser;
use job_aggregator::cli::{self, Cli};
use job_aggregator::core::ConfigManager;
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "job_aggregator=info,jobsweep=info,rocket=warn";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigManager::load()?;

    init_logging(&config.environment.log_path)?;

    info!("Environment: {}", config.environment_name);
    info!("Database: {}", config.environment.database_path.display());
    info!("Rosters: {}", config.environment.roster_path.display());

    cli::run(cli, config).await
}

fn init_logging(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}
