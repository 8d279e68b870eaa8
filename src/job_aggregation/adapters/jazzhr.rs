// src/job_aggregation/adapters/jazzhr.rs
use async_trait::async_trait;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;

use super::{PlatformAdapter, TenantBoard};
use crate::core::html::element_text;
use crate::core::http_client::FetchError;
use crate::job_aggregation::fetch_engine::TenantOutcome;
use crate::job_aggregation::filters::{QueryMatcher, ScrapeFilters};
use crate::job_aggregation::types::{display_company, JobPosting, Platform};

const APPLY_ENDPOINT: &str = "https://{tenant}.applytojob.com/apply";

pub struct JazzHrAdapter {
    board: TenantBoard,
}

impl JazzHrAdapter {
    pub fn new(board: TenantBoard) -> Self {
        Self { board }
    }

    async fn fetch_tenant(
        &self,
        tenant: &str,
        matcher: &QueryMatcher,
        filters: &ScrapeFilters,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.board.url_for(APPLY_ENDPOINT, tenant);
        let base = Url::parse(&url).map_err(|e| FetchError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let html = self.board.http().get_html(&url, &[]).await?;

        Ok(parse_apply_page(&html, &base, tenant)
            .into_iter()
            .filter(|posting| matcher.matches(&[posting.title.as_deref()]))
            .filter(|posting| filters.admits(posting))
            .collect())
    }
}

/// Listing anchors point at `/apply/<code>/<slug>`; anything without text is
/// a button or icon link.
fn parse_apply_page(html: &str, base: &Url, tenant: &str) -> Vec<JobPosting> {
    let Ok(link_selector) = Selector::parse("a[href*='/apply/']") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    document
        .select(&link_selector)
        .filter_map(|anchor| {
            let job_url = base.join(anchor.value().attr("href")?).ok()?.to_string();
            let title = element_text(anchor);
            if title.is_empty() || !seen.insert(job_url.clone()) {
                return None;
            }
            Some(
                JobPosting::new(job_url, Platform::JazzHr)
                    .with_title(Some(title))
                    .with_company(Some(display_company(tenant))),
            )
        })
        .collect()
}

#[async_trait]
impl PlatformAdapter for JazzHrAdapter {
    fn platform(&self) -> Platform {
        Platform::JazzHr
    }

    fn roster_size(&self) -> usize {
        self.board.tenant_count()
    }

    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting> {
        let matcher = QueryMatcher::new(query);
        let matcher = &matcher;
        self.board
            .collect(Platform::JazzHr, limit, |tenant| async move {
                TenantOutcome::from_result(tenant, self.fetch_tenant(tenant, matcher, filters).await)
            })
            .await
    }
}
