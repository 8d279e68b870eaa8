// src/job_aggregation/adapters/bamboohr.rs
use async_trait::async_trait;
use serde::Deserialize;

use super::{join_location, IdValue, PlatformAdapter, TenantBoard};
use crate::core::http_client::FetchError;
use crate::job_aggregation::fetch_engine::TenantOutcome;
use crate::job_aggregation::filters::{QueryMatcher, ScrapeFilters};
use crate::job_aggregation::recency::parse_posted_at;
use crate::job_aggregation::types::{display_company, JobPosting, Platform};

const LIST_ENDPOINT: &str = "https://{tenant}.bamboohr.com/careers/list";

#[derive(Debug, Deserialize)]
struct CareersList {
    #[serde(default)]
    result: Vec<Opening>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Opening {
    id: IdValue,
    job_opening_name: Option<String>,
    department_label: Option<String>,
    location: Option<OpeningLocation>,
    date_created: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpeningLocation {
    city: Option<String>,
    state: Option<String>,
}

pub struct BambooHrAdapter {
    board: TenantBoard,
}

impl BambooHrAdapter {
    pub fn new(board: TenantBoard) -> Self {
        Self { board }
    }

    async fn fetch_tenant(
        &self,
        tenant: &str,
        matcher: &QueryMatcher,
        filters: &ScrapeFilters,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.board.url_for(LIST_ENDPOINT, tenant);
        let list: CareersList = self.board.http().get_json(&url).await?;
        let careers_base = url.trim_end_matches("/list");

        Ok(list
            .result
            .into_iter()
            .filter(|o| matcher.matches(&[o.job_opening_name.as_deref(), o.department_label.as_deref()]))
            .map(|o| {
                let location = o.location.as_ref().and_then(|l| {
                    l.city.as_ref()?;
                    join_location(&[l.city.as_deref(), l.state.as_deref()])
                });
                JobPosting::new(format!("{}/{}", careers_base, o.id), Platform::BambooHr)
                    .with_title(o.job_opening_name)
                    .with_company(Some(display_company(tenant)))
                    .with_location(location)
                    .with_posted_at(o.date_created.as_deref().and_then(parse_posted_at))
            })
            .filter(|posting| filters.admits(posting))
            .collect())
    }
}

#[async_trait]
impl PlatformAdapter for BambooHrAdapter {
    fn platform(&self) -> Platform {
        Platform::BambooHr
    }

    fn roster_size(&self) -> usize {
        self.board.tenant_count()
    }

    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting> {
        let matcher = QueryMatcher::new(query);
        let matcher = &matcher;
        self.board
            .collect(Platform::BambooHr, limit, |tenant| async move {
                TenantOutcome::from_result(tenant, self.fetch_tenant(tenant, matcher, filters).await)
            })
            .await
    }
}
