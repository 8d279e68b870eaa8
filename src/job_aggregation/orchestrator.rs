// src/job_aggregation/orchestrator.rs
//! Fans one query out to every selected platform and merges what comes back.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::adapters::{AdapterMap, PlatformAdapter};
use super::filters::ScrapeFilters;
use super::types::{JobPosting, Platform};

#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub postings: Vec<JobPosting>,
    /// Every selected platform appears, including ones that contributed nothing.
    pub platform_stats: BTreeMap<Platform, usize>,
    /// Postings dropped as already known or already seen in this run.
    pub duplicates_filtered: usize,
}

/// Even split of the overall limit, rounded up.
pub fn per_platform_limit(total_limit: usize, platform_count: usize) -> usize {
    if platform_count == 0 {
        return 0;
    }
    total_limit.div_ceil(platform_count)
}

#[derive(Clone)]
pub struct Aggregator {
    adapters: Arc<AdapterMap>,
}

impl Aggregator {
    pub fn new(adapters: AdapterMap) -> Self {
        Self {
            adapters: Arc::new(adapters),
        }
    }

    pub fn adapter(&self, platform: Platform) -> Option<&Arc<dyn PlatformAdapter>> {
        self.adapters.get(&platform)
    }

    pub async fn aggregate(
        &self,
        query: &str,
        platforms: &[Platform],
        total_limit: usize,
        existing: &HashSet<String>,
        filters: &ScrapeFilters,
    ) -> AggregateOutcome {
        let mut outcome = AggregateOutcome::default();
        let cap = per_platform_limit(total_limit, platforms.len());

        let mut pending = FuturesUnordered::new();
        for &platform in platforms {
            outcome.platform_stats.insert(platform, 0);

            let Some(adapter) = self.adapters.get(&platform).cloned() else {
                warn!("No adapter registered for {}", platform);
                continue;
            };
            let query = query.to_string();
            let filters = filters.clone();
            let handle = tokio::spawn(async move { adapter.scrape(&query, cap, &filters).await });
            pending.push(async move { (platform, handle.await) });
        }

        info!(
            "Aggregating '{}' across {} platform(s), {} per platform",
            query,
            pending.len(),
            cap
        );

        let mut seen: HashSet<String> = HashSet::new();
        while let Some((platform, joined)) = pending.next().await {
            let postings = match joined {
                Ok(postings) => postings,
                Err(e) => {
                    error!("[{}] adapter task failed: {}", platform, e);
                    continue;
                }
            };

            let fetched = postings.len();
            let mut kept = 0usize;
            for posting in postings {
                if outcome.postings.len() >= total_limit {
                    break;
                }
                if existing.contains(&posting.url_hash) || !seen.insert(posting.url_hash.clone()) {
                    outcome.duplicates_filtered += 1;
                    continue;
                }
                outcome.postings.push(posting);
                kept += 1;
            }

            if let Some(count) = outcome.platform_stats.get_mut(&platform) {
                *count += kept;
            }
            info!("[{}] fetched {}, kept {}", platform, fetched, kept);
        }

        outcome
    }
}
