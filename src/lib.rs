//! Aggregates job postings from public applicant-tracking-system boards,
//! deduplicates them against what was already seen, and serves the merged
//! result over HTTP.

pub mod app;
pub mod cli;
pub mod core;
pub mod job_aggregation;
pub mod web;
pub mod web_search;

pub use app::AppContext;
pub use web::{build_rocket, start_web_server};
