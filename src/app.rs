// src/app.rs
//! Wires configuration, storage, rosters and HTTP into the shared services
//! that both the web server and the CLI run on.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::core::{ConfigManager, Database, HttpFetcher, TtlCache};
use crate::job_aggregation::adapters::build_adapters;
use crate::job_aggregation::{Aggregator, ScrapeService, TenantRoster};
use crate::web_search::SearchService;

pub struct AppContext {
    pub scrape: ScrapeService,
    pub search: SearchService,
    pub roster: TenantRoster,
    pub database: Arc<Database>,
}

impl AppContext {
    pub async fn build(config: &ConfigManager) -> Result<Self> {
        let roster = TenantRoster::load(&config.environment.roster_path)?;
        let database = Arc::new(Database::new(&config.environment.database_path).await?);

        let scraper_http =
            HttpFetcher::new(config.scraper.request_timeout()).context("Failed to build scraper HTTP client")?;
        let search_http =
            HttpFetcher::new(config.search.request_timeout()).context("Failed to build search HTTP client")?;

        let adapters = build_adapters(&roster, &scraper_http, config.scraper.batch_size);
        let scrape = ScrapeService::new(
            Aggregator::new(adapters),
            database.clone(),
            TtlCache::new(config.scraper.session_cache_capacity, config.scraper.session_cache_ttl()),
            config.scraper.recency_window_days,
        );
        let search = SearchService::new(search_http, config.search.cache_ttl());

        info!(
            "Application ready: roster v{} ({} tenants), database {}",
            roster.version(),
            roster.total_tenants(),
            config.environment.database_path.display()
        );

        Ok(Self {
            scrape,
            search,
            roster,
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn builds_from_config_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let roster_path = dir.path().join("rosters.toml");
        let mut roster = std::fs::File::create(&roster_path).unwrap();
        roster
            .write_all(b"version = 2\n\n[platforms]\nlever = [\"netflix\"]\n")
            .unwrap();

        let yaml = format!(
            "local:\n  database_path: {}\n  roster_path: {}\n  log_path: {}\n",
            dir.path().join("jobs.db").display(),
            roster_path.display(),
            dir.path().join("jobs.log").display()
        );
        let config = ConfigManager::from_yaml_str(&yaml, "local").unwrap();

        let ctx = AppContext::build(&config).await.unwrap();
        assert_eq!(ctx.roster.version(), 2);
        assert_eq!(
            ctx.scrape
                .aggregator()
                .adapter(crate::job_aggregation::Platform::Lever)
                .map(|a| a.roster_size()),
            Some(1)
        );
    }
}
