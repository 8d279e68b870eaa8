// src/job_aggregation/store.rs
//! The persistence interface the aggregation core talks to.
//!
//! Nothing in the core knows how postings or sessions are stored; it only
//! reads hash sets at the start of a scrape and writes results afterwards.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::types::{JobPosting, Platform};

/// Which set of previously seen postings a read or write targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupScope {
    Global,
    Table(String),
}

impl fmt::Display for DedupScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupScope::Global => f.write_str("global"),
            DedupScope::Table(id) => write!(f, "table:{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            other => anyhow::bail!("Unknown session status: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeSession {
    pub id: String,
    pub query: String,
    pub platforms: Vec<Platform>,
    pub requested_limit: u32,
    pub jobs_found: u64,
    pub duplicates_filtered: u64,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// An unknown table yields an empty set rather than an error.
    async fn load_existing_hashes(&self, scope: &DedupScope) -> Result<HashSet<String>>;

    async fn create_session(&self, query: &str, platforms: &[Platform], requested_limit: u32) -> Result<String>;

    /// Already-present hashes are skipped silently. Returns the number of new rows.
    async fn insert_postings(&self, postings: &[JobPosting], scope: &DedupScope, search_query: &str) -> Result<u64>;

    async fn complete_session(&self, session_id: &str, jobs_found: usize, duplicates_filtered: usize) -> Result<()>;

    async fn health_check(&self) -> Result<()>;
}
