// src/job_aggregation/adapters/greenhouse.rs
use async_trait::async_trait;
use serde::Deserialize;

use super::{IdValue, PlatformAdapter, TenantBoard};
use crate::core::http_client::FetchError;
use crate::job_aggregation::fetch_engine::TenantOutcome;
use crate::job_aggregation::filters::{QueryMatcher, ScrapeFilters};
use crate::job_aggregation::recency::parse_posted_at;
use crate::job_aggregation::types::{display_company, JobPosting, Platform};

const JOBS_ENDPOINT: &str = "https://boards-api.greenhouse.io/v1/boards/{tenant}/jobs";

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<GreenhouseJob>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseJob {
    id: Option<IdValue>,
    title: Option<String>,
    absolute_url: Option<String>,
    location: Option<Named>,
    updated_at: Option<String>,
    #[serde(default)]
    departments: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

pub struct GreenhouseAdapter {
    board: TenantBoard,
}

impl GreenhouseAdapter {
    pub fn new(board: TenantBoard) -> Self {
        Self { board }
    }

    async fn fetch_tenant(
        &self,
        tenant: &str,
        matcher: &QueryMatcher,
        filters: &ScrapeFilters,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.board.url_for(JOBS_ENDPOINT, tenant);
        let response: BoardResponse = self.board.http().get_json(&url).await?;

        let postings = response
            .jobs
            .into_iter()
            .filter(|job| {
                let department = job.departments.first().and_then(|d| d.name.as_deref());
                matcher.matches(&[job.title.as_deref(), department])
            })
            .filter_map(|job| {
                let url = job.absolute_url.or_else(|| {
                    job.id
                        .as_ref()
                        .map(|id| format!("https://boards.greenhouse.io/{}/jobs/{}", tenant, id))
                })?;
                Some(
                    JobPosting::new(url, Platform::Greenhouse)
                        .with_title(job.title)
                        .with_company(Some(display_company(tenant)))
                        .with_location(job.location.and_then(|l| l.name))
                        .with_posted_at(job.updated_at.as_deref().and_then(parse_posted_at)),
                )
            })
            .filter(|posting| filters.admits(posting))
            .collect();

        Ok(postings)
    }
}

#[async_trait]
impl PlatformAdapter for GreenhouseAdapter {
    fn platform(&self) -> Platform {
        Platform::Greenhouse
    }

    fn roster_size(&self) -> usize {
        self.board.tenant_count()
    }

    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting> {
        let matcher = QueryMatcher::new(query);
        let matcher = &matcher;
        self.board
            .collect(Platform::Greenhouse, limit, |tenant| async move {
                TenantOutcome::from_result(tenant, self.fetch_tenant(tenant, matcher, filters).await)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http_client::test_support::silent_listener;
    use crate::job_aggregation::adapters::test_support::{board, board_with_timeout, open_filters};
    use std::time::{Duration, Instant};

    const BOARD: &str = r#"{
        "jobs": [
            {"id": 1, "title": "Senior Software Engineer", "absolute_url": "https://boards.greenhouse.io/acme/jobs/1",
             "location": {"name": "San Francisco, CA"}, "updated_at": "2024-03-01T10:00:00-05:00",
             "departments": [{"name": "Engineering"}]},
            {"id": 2, "title": "Account Executive", "location": {"name": "London, UK"},
             "departments": [{"name": "Sales"}]},
            {"id": 3, "title": "Data Scientist", "location": {"name": "Remote"},
             "departments": [{"name": "Software Engineering"}]}
        ]
    }"#;

    #[tokio::test]
    async fn matches_title_or_department_and_builds_fallback_urls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/boards/acme/jobs")
            .with_status(200)
            .with_body(BOARD)
            .create_async()
            .await;

        let adapter = GreenhouseAdapter::new(board(&["acme"], format!("{}/boards/{{tenant}}/jobs", server.url())));
        let postings = adapter.scrape("software", 100, &open_filters()).await;

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title.as_deref(), Some("Senior Software Engineer"));
        assert_eq!(postings[0].company.as_deref(), Some("Acme"));
        assert!(postings[0].posted_at.is_some());
        assert_eq!(postings[1].url, "https://boards.greenhouse.io/acme/jobs/3");
    }

    #[tokio::test]
    async fn usa_only_drops_foreign_locations() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/boards/acme/jobs")
            .with_status(200)
            .with_body(BOARD)
            .create_async()
            .await;

        let adapter = GreenhouseAdapter::new(board(&["acme"], format!("{}/boards/{{tenant}}/jobs", server.url())));
        let postings = adapter.scrape("", 100, &ScrapeFilters::new(true, None)).await;

        assert_eq!(postings.len(), 2);
        assert!(postings.iter().all(|p| p.location.as_deref() != Some("London, UK")));
    }

    #[tokio::test]
    async fn failing_tenant_does_not_hide_others() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/boards/broken/jobs")
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("GET", "/boards/acme/jobs")
            .with_status(200)
            .with_body(BOARD)
            .create_async()
            .await;

        let adapter = GreenhouseAdapter::new(board(
            &["broken", "acme"],
            format!("{}/boards/{{tenant}}/jobs", server.url()),
        ));
        let postings = adapter.scrape("", 100, &open_filters()).await;

        assert_eq!(postings.len(), 3);
        assert!(postings.iter().all(|p| p.platform == Platform::Greenhouse));
    }

    #[tokio::test]
    async fn stalled_tenant_times_out_without_hiding_others() {
        let stalled = silent_listener().await.to_string();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jobs")
            .with_status(200)
            .with_body(BOARD)
            .create_async()
            .await;
        let healthy = server.host_with_port();

        let adapter = GreenhouseAdapter::new(board_with_timeout(
            &[stalled.as_str(), healthy.as_str()],
            "http://{tenant}/jobs".to_string(),
            Duration::from_millis(300),
        ));
        let started = Instant::now();
        let postings = adapter.scrape("", 100, &open_filters()).await;

        assert_eq!(postings.len(), 3);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
