// src/job_aggregation/adapters/jobvite.rs
//! Jobvite has no public JSON feed; postings are read off the search page.

use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use super::{PlatformAdapter, TenantBoard};
use crate::core::html::element_text;
use crate::core::http_client::FetchError;
use crate::job_aggregation::fetch_engine::TenantOutcome;
use crate::job_aggregation::filters::{QueryMatcher, ScrapeFilters};
use crate::job_aggregation::types::{display_company, JobPosting, Platform};

const SEARCH_ENDPOINT: &str = "https://jobs.jobvite.com/{tenant}/search";

pub struct JobviteAdapter {
    board: TenantBoard,
}

impl JobviteAdapter {
    pub fn new(board: TenantBoard) -> Self {
        Self { board }
    }

    async fn fetch_tenant(
        &self,
        tenant: &str,
        matcher: &QueryMatcher,
        filters: &ScrapeFilters,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.board.url_for(SEARCH_ENDPOINT, tenant);
        let base = Url::parse(&url).map_err(|e| FetchError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let html = self.board.http().get_html(&url, &[("q", matcher.as_str())]).await?;

        Ok(parse_search_page(&html, &base, tenant)
            .into_iter()
            .filter(|posting| matcher.matches(&[posting.title.as_deref()]))
            .filter(|posting| filters.admits(posting))
            .collect())
    }
}

fn parse_search_page(html: &str, base: &Url, tenant: &str) -> Vec<JobPosting> {
    let (Ok(link_selector), Ok(location_selector)) = (
        Selector::parse("a[href*='/job/']"),
        Selector::parse(".jv-job-list-location"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut postings = Vec::new();

    for anchor in document.select(&link_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(job_url) = base.join(href) else {
            continue;
        };
        let title = element_text(anchor);
        if title.is_empty() || !seen.insert(job_url.to_string()) {
            continue;
        }

        let location = anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "tr")
            .and_then(|row| row.select(&location_selector).next())
            .map(element_text);

        postings.push(
            JobPosting::new(job_url.to_string(), Platform::Jobvite)
                .with_title(Some(title))
                .with_company(Some(display_company(tenant)))
                .with_location(location),
        );
    }

    postings
}

#[async_trait]
impl PlatformAdapter for JobviteAdapter {
    fn platform(&self) -> Platform {
        Platform::Jobvite
    }

    fn roster_size(&self) -> usize {
        self.board.tenant_count()
    }

    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting> {
        let matcher = QueryMatcher::new(query);
        let matcher = &matcher;
        self.board
            .collect(Platform::Jobvite, limit, |tenant| async move {
                TenantOutcome::from_result(tenant, self.fetch_tenant(tenant, matcher, filters).await)
            })
            .await
    }
}
