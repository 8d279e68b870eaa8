// src/job_aggregation/service.rs
//! Request-level scrape flow: dedup scope, session bookkeeping, aggregation,
//! persistence, session caching and paging.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::filters::ScrapeFilters;
use super::orchestrator::Aggregator;
use super::pagination::{page, PAGE_SIZE};
use super::store::{DedupScope, JobStore};
use super::types::{JobPosting, Platform};
use crate::core::ttl_cache::TtlCache;

pub const ALLOWED_LIMITS: [u32; 4] = [400, 500, 1000, 2000];
pub const DEFAULT_LIMIT: u32 = 400;

/// Anything outside the allowed set falls back to the default.
pub fn coerce_limit(requested: Option<i64>) -> u32 {
    requested
        .and_then(|limit| u32::try_from(limit).ok())
        .filter(|limit| ALLOWED_LIMITS.contains(limit))
        .unwrap_or(DEFAULT_LIMIT)
}

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub query: String,
    pub platforms: Vec<Platform>,
    pub limit: u32,
    pub offset: usize,
    pub filter_duplicates: bool,
    pub dedupe_table_id: Option<String>,
    pub save_to_table_id: Option<String>,
    pub usa_only: bool,
    /// `None` uses the configured window; `Some(0)` disables the recency check.
    pub max_age_days: Option<u32>,
    pub session_id: Option<String>,
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            platforms: Platform::default_selection(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            filter_duplicates: true,
            dedupe_table_id: None,
            save_to_table_id: None,
            usa_only: true,
            max_age_days: None,
            session_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub jobs: Vec<JobPosting>,
    pub total_jobs: usize,
    pub offset: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub platform_stats: BTreeMap<Platform, usize>,
    pub duplicates_filtered: usize,
    pub session_id: String,
    pub from_cache: bool,
}

/// Full ordered result of a finished scrape, kept for continuation calls.
#[derive(Debug, Clone)]
pub struct CachedScrape {
    postings: Arc<[JobPosting]>,
    platform_stats: BTreeMap<Platform, usize>,
    duplicates_filtered: usize,
}

pub struct ScrapeService {
    aggregator: Aggregator,
    store: Arc<dyn JobStore>,
    sessions: TtlCache<CachedScrape>,
    default_max_age_days: u32,
}

impl ScrapeService {
    pub fn new(
        aggregator: Aggregator,
        store: Arc<dyn JobStore>,
        sessions: TtlCache<CachedScrape>,
        default_max_age_days: u32,
    ) -> Self {
        Self {
            aggregator,
            store,
            sessions,
            default_max_age_days,
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// A `session_id` still in the cache pins the query, platforms and filters of the run that
    /// created it; only `offset` is read from a continuation request.
    pub async fn scrape(&self, request: ScrapeRequest) -> Result<ScrapeReport> {
        if let Some(session_id) = request.session_id.as_deref() {
            if let Some(cached) = self.sessions.get(session_id) {
                info!("Serving session {} from cache at offset {}", session_id, request.offset);
                return Ok(Self::report(&cached, session_id.to_string(), request.offset, true));
            }
        }

        let platforms = if request.platforms.is_empty() {
            Platform::default_selection()
        } else {
            request.platforms.clone()
        };

        let existing = self.existing_hashes(&request).await;
        let session_id = match request.session_id.clone() {
            Some(id) => id,
            None => self.open_session(&request.query, &platforms, request.limit).await,
        };

        let max_age_days = request.max_age_days.unwrap_or(self.default_max_age_days);
        let filters = ScrapeFilters::new(request.usa_only, Some(max_age_days));

        info!(
            "Scrape {} started: query='{}' platforms={} limit={} existing_hashes={}",
            session_id,
            request.query,
            platforms.len(),
            request.limit,
            existing.len()
        );

        let outcome = self
            .aggregator
            .aggregate(&request.query, &platforms, request.limit as usize, &existing, &filters)
            .await;

        self.persist(&request, &session_id, &outcome.postings, outcome.duplicates_filtered)
            .await;

        let cached = CachedScrape {
            postings: Arc::from(outcome.postings),
            platform_stats: outcome.platform_stats,
            duplicates_filtered: outcome.duplicates_filtered,
        };
        self.sessions.insert(session_id.clone(), cached.clone());

        info!(
            "Scrape {} finished: {} postings, {} duplicates filtered",
            session_id,
            cached.postings.len(),
            cached.duplicates_filtered
        );

        Ok(Self::report(&cached, session_id, request.offset, false))
    }

    async fn existing_hashes(&self, request: &ScrapeRequest) -> HashSet<String> {
        if !request.filter_duplicates {
            return HashSet::new();
        }

        let scope = match &request.dedupe_table_id {
            Some(table_id) => DedupScope::Table(table_id.clone()),
            None => DedupScope::Global,
        };

        match self.store.load_existing_hashes(&scope).await {
            Ok(hashes) => hashes,
            Err(e) => {
                warn!("Could not load existing hashes for {}: {:#}", scope, e);
                HashSet::new()
            }
        }
    }

    async fn open_session(&self, query: &str, platforms: &[Platform], limit: u32) -> String {
        match self.store.create_session(query, platforms, limit).await {
            Ok(id) => id,
            Err(e) => {
                let id = Uuid::new_v4().to_string();
                warn!("Could not record scrape session, continuing as {}: {:#}", id, e);
                id
            }
        }
    }

    async fn persist(&self, request: &ScrapeRequest, session_id: &str, postings: &[JobPosting], duplicates: usize) {
        if let Err(e) = self
            .store
            .insert_postings(postings, &DedupScope::Global, &request.query)
            .await
        {
            warn!("Failed to store postings for session {}: {:#}", session_id, e);
        }

        if let Some(table_id) = &request.save_to_table_id {
            let scope = DedupScope::Table(table_id.clone());
            if let Err(e) = self.store.insert_postings(postings, &scope, &request.query).await {
                warn!("Failed to save postings to table {}: {:#}", table_id, e);
            }
        }

        if let Err(e) = self
            .store
            .complete_session(session_id, postings.len(), duplicates)
            .await
        {
            warn!("Failed to complete session {}: {:#}", session_id, e);
        }
    }

    fn report(cached: &CachedScrape, session_id: String, offset: usize, from_cache: bool) -> ScrapeReport {
        let slice = page(&cached.postings, offset, PAGE_SIZE);
        ScrapeReport {
            jobs: slice.items.to_vec(),
            total_jobs: cached.postings.len(),
            offset,
            page_size: PAGE_SIZE,
            has_more: slice.has_more,
            platform_stats: cached.platform_stats.clone(),
            duplicates_filtered: cached.duplicates_filtered,
            session_id,
            from_cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::Database;
    use crate::job_aggregation::adapters::{AdapterMap, PlatformAdapter};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingAdapter {
        urls: Vec<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PlatformAdapter for CountingAdapter {
        fn platform(&self) -> Platform {
            Platform::Greenhouse
        }

        fn roster_size(&self) -> usize {
            1
        }

        async fn scrape(&self, _query: &str, limit: usize, _filters: &ScrapeFilters) -> Vec<JobPosting> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls
                .iter()
                .take(limit)
                .map(|u| JobPosting::new(u.clone(), Platform::Greenhouse))
                .collect()
        }
    }

    async fn service(postings: usize) -> (ScrapeService, Arc<CountingAdapter>, Arc<Database>) {
        let adapter = Arc::new(CountingAdapter {
            urls: (0..postings).map(|i| format!("https://boards.example/{i}")).collect(),
            calls: AtomicUsize::new(0),
        });
        let mut adapters: AdapterMap = AdapterMap::new();
        adapters.insert(Platform::Greenhouse, adapter.clone() as Arc<dyn PlatformAdapter>);

        let db = Arc::new(Database::in_memory().await.unwrap());
        let service = ScrapeService::new(
            Aggregator::new(adapters),
            db.clone(),
            TtlCache::new(16, Duration::from_secs(3600)),
            60,
        );
        (service, adapter, db)
    }

    fn greenhouse_request() -> ScrapeRequest {
        ScrapeRequest {
            platforms: vec![Platform::Greenhouse],
            ..ScrapeRequest::default()
        }
    }

    #[test]
    fn limits_outside_the_allowed_set_coerce_to_default() {
        assert_eq!(coerce_limit(Some(1000)), 1000);
        assert_eq!(coerce_limit(Some(2000)), 2000);
        assert_eq!(coerce_limit(Some(750)), 400);
        assert_eq!(coerce_limit(Some(-5)), 400);
        assert_eq!(coerce_limit(None), 400);
    }

    #[tokio::test]
    async fn first_page_and_cached_continuation() {
        let (service, adapter, db) = service(250).await;

        let first = service.scrape(greenhouse_request()).await.unwrap();
        assert_eq!(first.jobs.len(), 100);
        assert_eq!(first.total_jobs, 250);
        assert!(first.has_more);
        assert!(!first.from_cache);

        let session = db.find_session(&first.session_id).await.unwrap().unwrap();
        assert_eq!(session.jobs_found, 250);

        let last = service
            .scrape(ScrapeRequest {
                offset: 200,
                session_id: Some(first.session_id.clone()),
                ..greenhouse_request()
            })
            .await
            .unwrap();

        assert_eq!(last.jobs.len(), 50);
        assert!(!last.has_more);
        assert!(last.from_cache);
        assert_eq!(last.offset, 200);
        assert_eq!(last.session_id, first.session_id);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cached_session_ignores_changed_parameters() {
        let (service, adapter, _db) = service(150).await;
        let first = service.scrape(greenhouse_request()).await.unwrap();

        let next = service
            .scrape(ScrapeRequest {
                query: "no such title".to_string(),
                platforms: vec![Platform::Lever],
                offset: 100,
                session_id: Some(first.session_id.clone()),
                ..greenhouse_request()
            })
            .await
            .unwrap();

        assert!(next.from_cache);
        assert_eq!(next.total_jobs, 150);
        assert_eq!(next.jobs.len(), 50);
        assert!(next.jobs.iter().all(|job| job.platform == Platform::Greenhouse));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_session_rescrapes_under_the_same_id() {
        let (service, adapter, _db) = service(10).await;

        let report = service
            .scrape(ScrapeRequest {
                session_id: Some("expired-session".to_string()),
                filter_duplicates: false,
                ..greenhouse_request()
            })
            .await
            .unwrap();

        assert_eq!(report.session_id, "expired-session");
        assert_eq!(report.total_jobs, 10);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_run_filters_everything_already_stored() {
        let (service, _adapter, _db) = service(30).await;

        let first = service.scrape(greenhouse_request()).await.unwrap();
        assert_eq!(first.total_jobs, 30);

        let second = service.scrape(greenhouse_request()).await.unwrap();
        assert_eq!(second.total_jobs, 0);
        assert_eq!(second.duplicates_filtered, 30);
        assert_eq!(second.platform_stats[&Platform::Greenhouse], 0);
        assert_ne!(second.session_id, first.session_id);
    }

    #[tokio::test]
    async fn empty_dedupe_table_behaves_like_no_filtering() {
        let (service, _adapter, db) = service(20).await;
        service.scrape(greenhouse_request()).await.unwrap();
        let table = db.tables().create("fresh").await.unwrap();

        let scoped = service
            .scrape(ScrapeRequest {
                dedupe_table_id: Some(table.id.clone()),
                ..greenhouse_request()
            })
            .await
            .unwrap();
        let unfiltered = service
            .scrape(ScrapeRequest {
                filter_duplicates: false,
                ..greenhouse_request()
            })
            .await
            .unwrap();

        assert_eq!(scoped.total_jobs, 20);
        assert_eq!(scoped.duplicates_filtered, 0);
        assert_eq!(scoped.total_jobs, unfiltered.total_jobs);
    }

    #[tokio::test]
    async fn save_to_table_populates_the_table() {
        let (service, _adapter, db) = service(5).await;
        let table = db.tables().create("saved").await.unwrap();

        service
            .scrape(ScrapeRequest {
                save_to_table_id: Some(table.id.clone()),
                ..greenhouse_request()
            })
            .await
            .unwrap();

        let hashes = db
            .load_existing_hashes(&DedupScope::Table(table.id))
            .await
            .unwrap();
        assert_eq!(hashes.len(), 5);
    }

    #[tokio::test]
    async fn persistence_failure_does_not_fail_the_scrape() {
        let (service, _adapter, _db) = service(5).await;

        let report = service
            .scrape(ScrapeRequest {
                save_to_table_id: Some("no-such-table".to_string()),
                ..greenhouse_request()
            })
            .await
            .unwrap();

        assert_eq!(report.total_jobs, 5);
    }
}
