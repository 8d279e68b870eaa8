// src/job_aggregation/adapters/enterprise.rs
use async_trait::async_trait;
use tracing::debug;

use super::PlatformAdapter;
use crate::job_aggregation::filters::ScrapeFilters;
use crate::job_aggregation::types::{JobPosting, Platform};

/// Workday, iCIMS, Taleo and SuccessFactors boards sit behind tenant
/// credentials this service does not hold, so their adapters return nothing.
pub struct EnterpriseAdapter {
    platform: Platform,
    roster_size: usize,
}

impl EnterpriseAdapter {
    pub fn new(platform: Platform, roster_size: usize) -> Self {
        Self { platform, roster_size }
    }
}

#[async_trait]
impl PlatformAdapter for EnterpriseAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn roster_size(&self) -> usize {
        self.roster_size
    }

    async fn scrape(&self, query: &str, _limit: usize, _filters: &ScrapeFilters) -> Vec<JobPosting> {
        debug!("[{}] no public listing endpoint, skipping '{}'", self.platform, query);
        Vec::new()
    }
}
