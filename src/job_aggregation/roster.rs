// src/job_aggregation/roster.rs
//! Known tenant slugs per platform, loaded from a versioned TOML file.
//!
//! ```toml
//! version = 3
//!
//! [platforms]
//! greenhouse = ["airbnb", "stripe"]
//! lever = ["netflix"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use super::types::Platform;

#[derive(Debug, Deserialize)]
struct RosterFile {
    version: u32,
    #[serde(default)]
    platforms: BTreeMap<String, Vec<String>>,
}

/// Read-only after load; cloned handles share the same slices.
#[derive(Debug, Clone, Default)]
pub struct TenantRoster {
    version: u32,
    tenants: HashMap<Platform, Arc<[String]>>,
}

impl TenantRoster {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tenant roster: {}", path.display()))?;
        let roster = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse tenant roster: {}", path.display()))?;

        info!(
            "Loaded tenant roster v{} from {} ({} tenants)",
            roster.version,
            path.display(),
            roster.total_tenants()
        );
        Ok(roster)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RosterFile = toml::from_str(content)?;

        let mut tenants = HashMap::new();
        for (key, slugs) in file.platforms {
            let platform = match Platform::from_str(&key) {
                Ok(platform) => platform,
                Err(_) => {
                    warn!("Ignoring roster entry for unknown platform '{}'", key);
                    continue;
                }
            };

            let mut seen = HashSet::new();
            let cleaned: Vec<String> = slugs
                .into_iter()
                .map(|slug| slug.trim().to_string())
                .filter(|slug| !slug.is_empty() && seen.insert(slug.to_lowercase()))
                .collect();
            tenants.insert(platform, Arc::from(cleaned));
        }

        Ok(Self {
            version: file.version,
            tenants,
        })
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Platform, Vec<S>)>,
        S: Into<String>,
    {
        let tenants = entries
            .into_iter()
            .map(|(platform, slugs)| {
                let slugs: Vec<String> = slugs.into_iter().map(Into::into).collect();
                (platform, Arc::from(slugs))
            })
            .collect();
        Self { version: 0, tenants }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn tenants(&self, platform: Platform) -> Arc<[String]> {
        self.tenants
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::<String>::new()))
    }

    pub fn total_tenants(&self) -> usize {
        self.tenants.values().map(|t| t.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
version = 7

[platforms]
greenhouse = ["airbnb", " stripe ", "Stripe", ""]
lever = ["netflix"]
monster = ["nobody"]
"#;

    #[test]
    fn parses_versioned_roster_and_cleans_slugs() {
        let roster = TenantRoster::from_toml_str(SAMPLE).unwrap();

        assert_eq!(roster.version(), 7);
        assert_eq!(&*roster.tenants(Platform::Greenhouse), &["airbnb", "stripe"]);
        assert_eq!(&*roster.tenants(Platform::Lever), &["netflix"]);
        assert!(roster.tenants(Platform::Jobvite).is_empty());
        assert_eq!(roster.total_tenants(), 3);
    }

    #[test]
    fn clones_share_tenant_storage() {
        let roster = TenantRoster::from_toml_str(SAMPLE).unwrap();
        let a = roster.tenants(Platform::Greenhouse);
        let b = roster.clone().tenants(Platform::Greenhouse);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let roster = TenantRoster::load(file.path()).unwrap();
        assert_eq!(roster.version(), 7);
    }

    #[test]
    fn missing_version_is_rejected() {
        assert!(TenantRoster::from_toml_str("[platforms]\nlever = []").is_err());
    }
}
