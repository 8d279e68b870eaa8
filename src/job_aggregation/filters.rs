// src/job_aggregation/filters.rs
use chrono::{DateTime, Utc};

use super::location;
use super::recency;
use super::types::JobPosting;

/// Per-request filters every adapter applies to its candidates.
#[derive(Debug, Clone)]
pub struct ScrapeFilters {
    pub usa_only: bool,
    /// `None` disables the recency check.
    pub max_age_days: Option<u32>,
    pub now: DateTime<Utc>,
}

impl ScrapeFilters {
    pub fn new(usa_only: bool, max_age_days: Option<u32>) -> Self {
        Self {
            usa_only,
            max_age_days: max_age_days.filter(|days| *days > 0),
            now: Utc::now(),
        }
    }

    pub fn admits(&self, posting: &JobPosting) -> bool {
        let location_ok = location::is_accepted(posting.location.as_deref(), self.usa_only);
        let recency_ok = match self.max_age_days {
            Some(days) => recency::is_recent_at(posting.posted_at, days, self.now),
            None => true,
        };
        location_ok && recency_ok
    }
}

impl Default for ScrapeFilters {
    fn default() -> Self {
        Self::new(true, None)
    }
}

/// Case-insensitive substring relevance; an empty query matches everything.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    needle: String,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, fields: &[Option<&str>]) -> bool {
        self.is_empty()
            || fields
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_aggregation::types::Platform;
    use chrono::Duration;

    #[test]
    fn empty_query_matches_anything() {
        let matcher = QueryMatcher::new("   ");
        assert!(matcher.is_empty());
        assert!(matcher.matches(&[None]));
        assert!(matcher.matches(&[]));
    }

    #[test]
    fn query_matches_any_field_case_insensitively() {
        let matcher = QueryMatcher::new("Rust");
        assert!(matcher.matches(&[Some("Senior RUST Engineer")]));
        assert!(matcher.matches(&[Some("Backend Engineer"), Some("Platform / Rust")]));
        assert!(!matcher.matches(&[Some("Go Engineer"), None]));
    }

    #[test]
    fn filters_combine_location_and_recency() {
        let filters = ScrapeFilters::new(true, Some(30));
        let fresh_us = JobPosting::new("https://x/1", Platform::Greenhouse)
            .with_location(Some("Denver, CO".to_string()))
            .with_posted_at(Some(filters.now - Duration::days(2)));
        let stale_us = fresh_us.clone().with_posted_at(Some(filters.now - Duration::days(90)));
        let fresh_abroad = fresh_us.clone().with_location(Some("Paris, France".to_string()));

        assert!(filters.admits(&fresh_us));
        assert!(!filters.admits(&stale_us));
        assert!(!filters.admits(&fresh_abroad));
    }

    #[test]
    fn zero_day_window_disables_recency() {
        let filters = ScrapeFilters::new(false, Some(0));
        assert_eq!(filters.max_age_days, None);
        let ancient = JobPosting::new("https://x/2", Platform::Lever)
            .with_posted_at(Some(filters.now - Duration::days(3650)));
        assert!(filters.admits(&ancient));
    }
}
