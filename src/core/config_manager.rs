// src/core/config_manager.rs
//! Loads `config.yaml`: per-environment paths plus shared scraper and search
//! tuning. Every field has a default, and a missing file means all defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    pub environment: EnvironmentConfig,
    pub scraper: ScraperConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub roster_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/jobsweep.db"),
            roster_path: PathBuf::from("rosters.toml"),
            log_path: PathBuf::from("logs/jobsweep.log"),
        }
    }
}

impl EnvironmentConfig {
    fn production() -> Self {
        Self {
            database_path: PathBuf::from("/app/data/jobsweep.db"),
            roster_path: PathBuf::from("/app/rosters.toml"),
            log_path: PathBuf::from("/app/logs/jobsweep.log"),
        }
    }

    fn resolved(self) -> Result<Self> {
        Ok(Self {
            database_path: resolve_path(&self.database_path)?,
            roster_path: resolve_path(&self.roster_path)?,
            log_path: resolve_path(&self.log_path)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub request_timeout_secs: u64,
    pub batch_size: usize,
    pub recency_window_days: u32,
    pub session_cache_ttl_secs: u64,
    pub session_cache_capacity: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            batch_size: 15,
            recency_window_days: 60,
            session_cache_ttl_secs: 3600,
            session_cache_capacity: 256,
        }
    }
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.session_cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            cache_ttl_secs: 3600,
        }
    }
}

impl SearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Option<EnvironmentConfig>,
    #[serde(default)]
    production: Option<EnvironmentConfig>,
    #[serde(default)]
    scraper: ScraperConfig,
    #[serde(default)]
    search: SearchConfig,
}

impl ConfigManager {
    /// Reads `config.yaml` from the working directory for the active environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE), &Self::environment_name())
    }

    pub fn load_from(path: &Path, environment: &str) -> Result<Self> {
        if !path.exists() {
            return Self::build(ConfigFile::default(), environment);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml_str(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml_str(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Self::build(file, environment)
    }

    fn build(file: ConfigFile, environment: &str) -> Result<Self> {
        let selected = match environment {
            "production" => file.production.unwrap_or_else(EnvironmentConfig::production),
            _ => file.local.unwrap_or_default(),
        };

        if file.scraper.batch_size == 0 {
            anyhow::bail!("scraper.batch_size must be at least 1");
        }

        Ok(Self {
            environment_name: environment.to_string(),
            environment: selected.resolved()?,
            scraper: file.scraper,
            search: file.search,
        })
    }

    pub fn environment_name() -> String {
        std::env::var("JOBSWEEP_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
local:
  database_path: tmp/local.db
  roster_path: rosters.toml
  log_path: tmp/local.log
production:
  database_path: /srv/jobs.db
  roster_path: /srv/rosters.toml
  log_path: /srv/jobs.log
scraper:
  batch_size: 20
search:
  cache_ttl_secs: 60
"#;

    #[test]
    fn selects_environment_section_and_fills_defaults() {
        let config = ConfigManager::from_yaml_str(SAMPLE, "production").unwrap();

        assert_eq!(config.environment.database_path, PathBuf::from("/srv/jobs.db"));
        assert_eq!(config.scraper.batch_size, 20);
        assert_eq!(config.scraper.request_timeout_secs, 15);
        assert_eq!(config.scraper.recency_window_days, 60);
        assert_eq!(config.search.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.search.request_timeout_secs, 10);
    }

    #[test]
    fn relative_paths_resolve_against_working_directory() {
        let config = ConfigManager::from_yaml_str(SAMPLE, "local").unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.environment.database_path, cwd.join("tmp/local.db"));
        assert!(config.environment.log_path.is_absolute());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::load_from(&dir.path().join("absent.yaml"), "local").unwrap();

        assert!(config.environment.roster_path.ends_with("rosters.toml"));
        assert_eq!(config.scraper.session_cache_capacity, 256);
        assert_eq!(config.scraper.session_cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn loads_from_file_and_rejects_zero_batches() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"scraper:\n  batch_size: 0\n").unwrap();
        assert!(ConfigManager::load_from(file.path(), "local").is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = ConfigManager::load_from(file.path(), "local").unwrap();
        assert_eq!(config.environment_name, "local");
    }
}
