// src/job_aggregation/adapters/lever.rs
use async_trait::async_trait;
use serde::Deserialize;

use super::{PlatformAdapter, TenantBoard};
use crate::core::http_client::FetchError;
use crate::job_aggregation::fetch_engine::TenantOutcome;
use crate::job_aggregation::filters::{QueryMatcher, ScrapeFilters};
use crate::job_aggregation::recency::from_epoch_millis;
use crate::job_aggregation::types::{display_company, JobPosting, Platform};

const POSTINGS_ENDPOINT: &str = "https://api.lever.co/v0/postings/{tenant}?mode=json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverPosting {
    text: Option<String>,
    hosted_url: Option<String>,
    apply_url: Option<String>,
    #[serde(default)]
    categories: Categories,
    created_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Categories {
    team: Option<String>,
    department: Option<String>,
    location: Option<String>,
    commitment: Option<String>,
}

pub struct LeverAdapter {
    board: TenantBoard,
}

impl LeverAdapter {
    pub fn new(board: TenantBoard) -> Self {
        Self { board }
    }

    async fn fetch_tenant(
        &self,
        tenant: &str,
        matcher: &QueryMatcher,
        filters: &ScrapeFilters,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.board.url_for(POSTINGS_ENDPOINT, tenant);
        let postings: Vec<LeverPosting> = self.board.http().get_json(&url).await?;

        Ok(postings
            .into_iter()
            .filter(|p| {
                let c = &p.categories;
                matcher.matches(&[
                    p.text.as_deref(),
                    c.team.as_deref(),
                    c.department.as_deref(),
                    c.location.as_deref(),
                    c.commitment.as_deref(),
                ])
            })
            .filter_map(|p| {
                let url = p.hosted_url.or(p.apply_url)?;
                Some(
                    JobPosting::new(url, Platform::Lever)
                        .with_title(p.text)
                        .with_company(Some(display_company(tenant)))
                        .with_location(p.categories.location)
                        .with_posted_at(p.created_at.and_then(from_epoch_millis)),
                )
            })
            .filter(|posting| filters.admits(posting))
            .collect())
    }
}

#[async_trait]
impl PlatformAdapter for LeverAdapter {
    fn platform(&self) -> Platform {
        Platform::Lever
    }

    fn roster_size(&self) -> usize {
        self.board.tenant_count()
    }

    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting> {
        let matcher = QueryMatcher::new(query);
        let matcher = &matcher;
        self.board
            .collect(Platform::Lever, limit, |tenant| async move {
                TenantOutcome::from_result(tenant, self.fetch_tenant(tenant, matcher, filters).await)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_aggregation::adapters::test_support::board;
    use chrono::Utc;

    #[tokio::test]
    async fn reads_category_text_and_epoch_dates() {
        let recent = Utc::now().timestamp_millis() - 86_400_000;
        let body = format!(
            r#"[
                {{"text": "Backend Engineer", "hostedUrl": "https://jobs.lever.co/acme/1",
                  "categories": {{"team": "Platform", "location": "New York, NY"}}, "createdAt": {recent}}},
                {{"text": "Office Manager", "applyUrl": "https://jobs.lever.co/acme/2/apply",
                  "categories": {{"team": "Platform Operations", "location": "Austin, TX"}}, "createdAt": 1262304000000}},
                {{"text": "Designer", "categories": {{"team": "Brand"}}}},
                {{"text": "Platform Lead"}}
            ]"#
        );

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/postings/acme")
            .match_query(mockito::Matcher::UrlEncoded("mode".into(), "json".into()))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let adapter = LeverAdapter::new(board(
            &["acme"],
            format!("{}/v0/postings/{{tenant}}?mode=json", server.url()),
        ));

        let everything = adapter.scrape("platform", 100, &ScrapeFilters::new(true, None)).await;
        // the last one matches but has no URL at all
        assert_eq!(everything.len(), 2);
        assert_eq!(everything[1].url, "https://jobs.lever.co/acme/2/apply");

        let recent_only = adapter.scrape("platform", 100, &ScrapeFilters::new(true, Some(60))).await;
        assert_eq!(recent_only.len(), 1);
        assert_eq!(recent_only[0].title.as_deref(), Some("Backend Engineer"));
        assert_eq!(recent_only[0].company.as_deref(), Some("Acme"));
    }
}
