// src/job_aggregation/mod.rs
pub mod adapters;
pub mod fetch_engine;
pub mod filters;
pub mod hasher;
pub mod location;
pub mod orchestrator;
pub mod pagination;
pub mod recency;
pub mod roster;
pub mod service;
pub mod store;
pub mod types;

pub use orchestrator::{AggregateOutcome, Aggregator};
pub use roster::TenantRoster;
pub use service::{ScrapeReport, ScrapeRequest, ScrapeService};
pub use store::{DedupScope, JobStore};
pub use types::{JobPosting, Platform};
