// src/job_aggregation/adapters/mod.rs
//! One adapter per ATS. Each walks its tenant roster through the batched fetch
//! engine and normalizes whatever the tenant board returns into `JobPosting`s.

mod ashby;
mod bamboohr;
mod enterprise;
mod greenhouse;
mod jazzhr;
mod jobvite;
mod lever;
mod smartrecruiters;

pub use ashby::AshbyAdapter;
pub use bamboohr::BambooHrAdapter;
pub use enterprise::EnterpriseAdapter;
pub use greenhouse::GreenhouseAdapter;
pub use jazzhr::JazzHrAdapter;
pub use jobvite::JobviteAdapter;
pub use lever::LeverAdapter;
pub use smartrecruiters::SmartRecruitersAdapter;

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::fetch_engine::{fetch_in_batches, TenantOutcome};
use super::filters::ScrapeFilters;
use super::roster::TenantRoster;
use super::types::{JobPosting, Platform};
use crate::core::http_client::HttpFetcher;

#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    fn roster_size(&self) -> usize;

    /// Never fails as a whole: unreachable or malformed tenants contribute
    /// nothing and the rest of the roster is still returned.
    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting>;
}

pub type AdapterMap = HashMap<Platform, Arc<dyn PlatformAdapter>>;

pub fn build_adapters(roster: &TenantRoster, http: &HttpFetcher, batch_size: usize) -> AdapterMap {
    let mut adapters: AdapterMap = HashMap::new();

    for platform in Platform::ALL {
        let tenants = roster.tenants(platform);
        let board = TenantBoard::new(http.clone(), tenants, batch_size);
        let adapter: Arc<dyn PlatformAdapter> = match platform {
            Platform::Greenhouse => Arc::new(GreenhouseAdapter::new(board)),
            Platform::Lever => Arc::new(LeverAdapter::new(board)),
            Platform::SmartRecruiters => Arc::new(SmartRecruitersAdapter::new(board)),
            Platform::AshbyHq => Arc::new(AshbyAdapter::new(board)),
            Platform::Jobvite => Arc::new(JobviteAdapter::new(board)),
            Platform::JazzHr => Arc::new(JazzHrAdapter::new(board)),
            Platform::BambooHr => Arc::new(BambooHrAdapter::new(board)),
            Platform::Workday | Platform::Icims | Platform::Taleo | Platform::SuccessFactors => {
                Arc::new(EnterpriseAdapter::new(platform, board.tenant_count()))
            }
        };
        adapters.insert(platform, adapter);
    }

    adapters
}

/// The roster, HTTP client and endpoint template an adapter works from.
#[derive(Debug, Clone)]
pub struct TenantBoard {
    http: HttpFetcher,
    tenants: Arc<[String]>,
    batch_size: usize,
    endpoint: Option<String>,
}

impl TenantBoard {
    pub fn new(http: HttpFetcher, tenants: Arc<[String]>, batch_size: usize) -> Self {
        Self {
            http,
            tenants,
            batch_size,
            endpoint: None,
        }
    }

    /// Replace the adapter's default endpoint. `{tenant}` is substituted per call.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn http(&self) -> &HttpFetcher {
        &self.http
    }

    pub fn tenant_count(&self) -> usize {
        self.tenants.len()
    }

    pub fn url_for(&self, default_endpoint: &str, tenant: &str) -> String {
        self.endpoint
            .as_deref()
            .unwrap_or(default_endpoint)
            .replace("{tenant}", tenant)
    }

    pub async fn collect<'a, F, Fut>(&'a self, platform: Platform, cap: usize, fetch_tenant: F) -> Vec<JobPosting>
    where
        F: Fn(&'a str) -> Fut,
        Fut: Future<Output = TenantOutcome>,
    {
        fetch_in_batches(platform, &self.tenants, self.batch_size, cap, fetch_tenant).await
    }
}

/// Boards disagree on whether ids are numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Number(n) => write!(f, "{}", n),
            IdValue::Text(s) => f.write_str(s),
        }
    }
}

/// Join non-empty parts with ", ", or `None` when nothing is left.
pub(crate) fn join_location(parts: &[Option<&str>]) -> Option<String> {
    let joined = parts
        .iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}
