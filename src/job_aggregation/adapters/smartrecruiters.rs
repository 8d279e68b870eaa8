// src/job_aggregation/adapters/smartrecruiters.rs
use async_trait::async_trait;
use serde::Deserialize;

use super::{join_location, IdValue, PlatformAdapter, TenantBoard};
use crate::core::http_client::FetchError;
use crate::job_aggregation::fetch_engine::TenantOutcome;
use crate::job_aggregation::filters::{QueryMatcher, ScrapeFilters};
use crate::job_aggregation::recency::parse_posted_at;
use crate::job_aggregation::types::{display_company, JobPosting, Platform};

const POSTINGS_ENDPOINT: &str = "https://api.smartrecruiters.com/v1/companies/{tenant}/postings?limit=100";

#[derive(Debug, Deserialize)]
struct PostingsPage {
    #[serde(default)]
    content: Vec<SmartPosting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SmartPosting {
    id: Option<IdValue>,
    name: Option<String>,
    company: Option<Company>,
    location: Option<SmartLocation>,
    department: Option<Department>,
    released_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Company {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SmartLocation {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Department {
    label: Option<String>,
}

impl SmartLocation {
    fn render(&self) -> Option<String> {
        let country = self.country.as_deref().map(str::to_uppercase);
        join_location(&[self.city.as_deref(), self.region.as_deref(), country.as_deref()])
    }
}

pub struct SmartRecruitersAdapter {
    board: TenantBoard,
}

impl SmartRecruitersAdapter {
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
        let page: PostingsPage = self.board.http().get_json(&url).await?;

        Ok(page
            .content
            .into_iter()
            .filter(|p| {
                let department = p.department.as_ref().and_then(|d| d.label.as_deref());
                matcher.matches(&[p.name.as_deref(), department])
            })
            .filter_map(|p| {
                // `ref` points at the API; the public page lives on jobs.smartrecruiters.com
                let url = format!("https://jobs.smartrecruiters.com/{}/{}", tenant, p.id?);
                let company = p
                    .company
                    .and_then(|c| c.name)
                    .unwrap_or_else(|| display_company(tenant));
                Some(
                    JobPosting::new(url, Platform::SmartRecruiters)
                        .with_title(p.name)
                        .with_company(Some(company))
                        .with_location(p.location.as_ref().and_then(SmartLocation::render))
                        .with_posted_at(p.released_date.as_deref().and_then(parse_posted_at)),
                )
            })
            .filter(|posting| filters.admits(posting))
            .collect())
    }
}

#[async_trait]
impl PlatformAdapter for SmartRecruitersAdapter {
    fn platform(&self) -> Platform {
        Platform::SmartRecruiters
    }

    fn roster_size(&self) -> usize {
        self.board.tenant_count()
    }

    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting> {
        let matcher = QueryMatcher::new(query);
        let matcher = &matcher;
        self.board
            .collect(Platform::SmartRecruiters, limit, |tenant| async move {
                TenantOutcome::from_result(tenant, self.fetch_tenant(tenant, matcher, filters).await)
            })
            .await
    }
}
