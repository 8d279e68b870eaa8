// src/job_aggregation/adapters/ashby.rs
//! Ashby exposes job boards only through its GraphQL gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{PlatformAdapter, TenantBoard};
use crate::core::http_client::FetchError;
use crate::job_aggregation::fetch_engine::TenantOutcome;
use crate::job_aggregation::filters::{QueryMatcher, ScrapeFilters};
use crate::job_aggregation::recency::parse_posted_at;
use crate::job_aggregation::types::{display_company, JobPosting, Platform};

const GRAPHQL_ENDPOINT: &str = "https://jobs.ashbyhq.com/api/non-user-graphql?op=ApiJobBoardWithTeams";
const OPERATION_NAME: &str = "ApiJobBoardWithTeams";
const JOB_BOARD_QUERY: &str = "query ApiJobBoardWithTeams($organizationHostedJobsPageName: String!) {
  jobBoard: jobBoardWithTeams(organizationHostedJobsPageName: $organizationHostedJobsPageName) {
    jobs {
      id
      title
      locationName
      employmentType
      publishedDate
    }
  }
}";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    operation_name: &'a str,
    variables: BoardVariables<'a>,
    query: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardVariables<'a> {
    organization_hosted_jobs_page_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<BoardData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardData {
    job_board: Option<JobBoard>,
}

#[derive(Debug, Deserialize)]
struct JobBoard {
    #[serde(default)]
    jobs: Vec<AshbyJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AshbyJob {
    id: String,
    title: Option<String>,
    location_name: Option<String>,
    published_date: Option<String>,
}

pub struct AshbyAdapter {
    board: TenantBoard,
}

impl AshbyAdapter {
    pub fn new(board: TenantBoard) -> Self {
        Self { board }
    }

    async fn fetch_tenant(
        &self,
        tenant: &str,
        matcher: &QueryMatcher,
        filters: &ScrapeFilters,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.board.url_for(GRAPHQL_ENDPOINT, tenant);
        let request = GraphQlRequest {
            operation_name: OPERATION_NAME,
            variables: BoardVariables {
                organization_hosted_jobs_page_name: tenant,
            },
            query: JOB_BOARD_QUERY,
        };
        let response: GraphQlResponse = self.board.http().post_json(&url, &request).await?;

        // unknown organizations come back as a null board
        let jobs = response
            .data
            .and_then(|d| d.job_board)
            .map(|b| b.jobs)
            .unwrap_or_default();

        Ok(jobs
            .into_iter()
            .filter(|job| matcher.matches(&[job.title.as_deref()]))
            .map(|job| {
                JobPosting::new(format!("https://jobs.ashbyhq.com/{}/{}", tenant, job.id), Platform::AshbyHq)
                    .with_title(job.title)
                    .with_company(Some(display_company(tenant)))
                    .with_location(job.location_name)
                    .with_posted_at(job.published_date.as_deref().and_then(parse_posted_at))
            })
            .filter(|posting| filters.admits(posting))
            .collect())
    }
}

#[async_trait]
impl PlatformAdapter for AshbyAdapter {
    fn platform(&self) -> Platform {
        Platform::AshbyHq
    }

    fn roster_size(&self) -> usize {
        self.board.tenant_count()
    }

    async fn scrape(&self, query: &str, limit: usize, filters: &ScrapeFilters) -> Vec<JobPosting> {
        let matcher = QueryMatcher::new(query);
        let matcher = &matcher;
        self.board
            .collect(Platform::AshbyHq, limit, |tenant| async move {
                TenantOutcome::from_result(tenant, self.fetch_tenant(tenant, matcher, filters).await)
            })
            .await
    }
}
