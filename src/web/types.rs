// src/web/types.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

use crate::job_aggregation::service::{coerce_limit, ScrapeReport, ScrapeRequest};
use crate::job_aggregation::{JobPosting, Platform};
use crate::web_search::OrganicResult;

// ===== Scrape =====

/// Body of `POST /api/scrape-jobs`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeJobsPayload {
    pub query: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub limit: Option<Value>,
    pub offset: Option<Value>,
    pub filter_duplicates: Option<bool>,
    pub dedupe_table_id: Option<String>,
    pub save_to_table_id: Option<String>,
    pub usa_only: Option<bool>,
    pub max_age_days: Option<u32>,
    pub session_id: Option<String>,
}

impl ScrapeJobsPayload {
    pub fn into_request(self) -> Result<ScrapeRequest, String> {
        let platforms = match self.platforms {
            Some(names) if !names.is_empty() => {
                let known: Vec<Platform> = names
                    .iter()
                    .filter_map(|name| match Platform::from_str(name) {
                        Ok(platform) => Some(platform),
                        Err(_) => {
                            warn!("Dropping unknown platform '{}'", name);
                            None
                        }
                    })
                    .fold(Vec::new(), |mut acc, platform| {
                        if !acc.contains(&platform) {
                            acc.push(platform);
                        }
                        acc
                    });
                if known.is_empty() {
                    return Err(format!("No supported platforms in request: {}", names.join(", ")));
                }
                known
            }
            _ => Platform::default_selection(),
        };

        let defaults = ScrapeRequest::default();
        Ok(ScrapeRequest {
            query: self.query.map(|q| q.trim().to_string()).unwrap_or_default(),
            platforms,
            limit: coerce_limit(self.limit.as_ref().and_then(Value::as_i64)),
            offset: self
                .offset
                .as_ref()
                .and_then(Value::as_u64)
                .and_then(|o| usize::try_from(o).ok())
                .unwrap_or(0),
            filter_duplicates: self.filter_duplicates.unwrap_or(defaults.filter_duplicates),
            dedupe_table_id: non_blank(self.dedupe_table_id),
            save_to_table_id: non_blank(self.save_to_table_id),
            usa_only: self.usa_only.unwrap_or(defaults.usa_only),
            max_age_days: self.max_age_days,
            session_id: non_blank(self.session_id),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct ScrapeJobsResponse {
    pub success: bool,
    pub jobs: Vec<JobPosting>,
    pub metadata: ScrapeMetadata,
}

#[derive(Debug, Serialize)]
pub struct ScrapeMetadata {
    pub total_jobs: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
    pub platform_stats: BTreeMap<Platform, usize>,
    pub duplicates_filtered: usize,
    pub response_time_ms: u64,
    pub session_id: String,
    pub cached: bool,
}

impl ScrapeJobsResponse {
    pub fn from_report(report: ScrapeReport, response_time_ms: u64) -> Self {
        Self {
            success: true,
            metadata: ScrapeMetadata {
                total_jobs: report.total_jobs,
                offset: report.offset,
                limit: report.page_size,
                has_more: report.has_more,
                platform_stats: report.platform_stats,
                duplicates_filtered: report.duplicates_filtered,
                response_time_ms,
                session_id: report.session_id,
                cached: report.from_cache,
            },
            jobs: report.jobs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>, response_time_ms: Option<u64>) -> Self {
        Self {
            success: false,
            error: error.into(),
            response_time_ms,
        }
    }
}

// ===== Search =====

#[derive(Debug, Default, Deserialize)]
pub struct SearchPayload {
    #[serde(alias = "q")]
    pub query: Option<String>,
    pub engine: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub organic_results: Vec<OrganicResult>,
    pub search_metadata: SearchMetadata,
}

#[derive(Debug, Serialize)]
pub struct SearchMetadata {
    pub query: String,
    pub engine: String,
    pub total_results: String,
    pub response_time_ms: u64,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

// ===== System =====

#[derive(Debug, Serialize)]
pub struct PlatformInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub stub: bool,
    pub default_selected: bool,
    pub roster_size: usize,
}

#[derive(Debug, Serialize)]
pub struct PlatformsResponse {
    pub success: bool,
    pub roster_version: u32,
    pub platforms: Vec<PlatformInfo>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub timestamp: String,
}
