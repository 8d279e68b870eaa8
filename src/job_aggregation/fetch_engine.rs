// src/job_aggregation/fetch_engine.rs
//! Drives a platform's tenant roster in fixed-size concurrent batches.
//!
//! Within a batch every tenant request runs at once and the batch settles
//! before the next one starts, which caps outbound connections per platform at
//! the batch size. Once the platform cap is reached no further batches start.

use futures::future::join_all;
use std::future::Future;
use tracing::{debug, info};

use super::types::{JobPosting, Platform};

/// Result of one tenant call. Failures contribute nothing and never escalate.
#[derive(Debug)]
pub enum TenantOutcome {
    Fetched(Vec<JobPosting>),
    Failed { tenant: String, reason: String },
}

impl TenantOutcome {
    pub fn from_result<E: std::fmt::Display>(tenant: &str, result: Result<Vec<JobPosting>, E>) -> Self {
        match result {
            Ok(postings) => TenantOutcome::Fetched(postings),
            Err(e) => TenantOutcome::Failed {
                tenant: tenant.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

pub async fn fetch_in_batches<'a, F, Fut>(
    platform: Platform,
    tenants: &'a [String],
    batch_size: usize,
    cap: usize,
    fetch_tenant: F,
) -> Vec<JobPosting>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = TenantOutcome>,
{
    let mut collected = Vec::new();
    if cap == 0 || tenants.is_empty() {
        return collected;
    }

    let mut failed = 0usize;
    let mut batches = 0usize;

    for batch in tenants.chunks(batch_size.max(1)) {
        batches += 1;
        let outcomes = join_all(batch.iter().map(|tenant| fetch_tenant(tenant.as_str()))).await;

        for outcome in outcomes {
            match outcome {
                TenantOutcome::Fetched(postings) => {
                    let room = cap - collected.len();
                    collected.extend(postings.into_iter().take(room));
                }
                TenantOutcome::Failed { tenant, reason } => {
                    failed += 1;
                    debug!("[{}] tenant {} skipped: {}", platform, tenant, reason);
                }
            }
            if collected.len() >= cap {
                break;
            }
        }

        if collected.len() >= cap {
            break;
        }
    }

    info!(
        "[{}] collected {} postings from {} batch(es), {} tenant failure(s)",
        platform,
        collected.len(),
        batches,
        failed
    );
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn roster(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tenant-{i}")).collect()
    }

    fn postings_for(tenant: &str, n: usize) -> Vec<JobPosting> {
        (0..n)
            .map(|i| JobPosting::new(format!("https://jobs.example/{tenant}/{i}"), Platform::Lever))
            .collect()
    }

    #[tokio::test]
    async fn stops_starting_batches_once_cap_is_reached() {
        let tenants = roster(100);
        let calls = AtomicUsize::new(0);

        let result = fetch_in_batches(Platform::Lever, &tenants, 10, 25, |tenant| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { TenantOutcome::Fetched(postings_for(tenant, 3)) }
        })
        .await;

        assert_eq!(result.len(), 25);
        // 10 tenants x 3 postings covers the cap in the first batch
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_batch_size() {
        let tenants = roster(37);
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let result = fetch_in_batches(Platform::Greenhouse, &tenants, 8, usize::MAX, |tenant| {
            let in_flight = &in_flight;
            let peak = &peak;
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                TenantOutcome::Fetched(postings_for(tenant, 1))
            }
        })
        .await;

        assert_eq!(result.len(), 37);
        assert!(peak.load(Ordering::SeqCst) <= 8);
        assert!(peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn failed_tenants_contribute_nothing_but_do_not_abort() {
        let tenants = roster(5);

        let result = fetch_in_batches(Platform::Jobvite, &tenants, 2, 100, |tenant| async move {
            if tenant == "tenant-1" {
                TenantOutcome::from_result::<String>(tenant, Err("request timed out".to_string()))
            } else {
                TenantOutcome::Fetched(postings_for(tenant, 2))
            }
        })
        .await;

        assert_eq!(result.len(), 8);
        assert!(result.iter().all(|p| !p.url.contains("tenant-1/")));
    }

    #[tokio::test]
    async fn all_failures_yield_empty_list() {
        let tenants = roster(3);
        let result = fetch_in_batches(Platform::BambooHr, &tenants, 15, 10, |tenant| async move {
            TenantOutcome::Failed {
                tenant: tenant.to_string(),
                reason: "HTTP 500".to_string(),
            }
        })
        .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn zero_cap_issues_no_requests() {
        let tenants = roster(3);
        let calls = AtomicUsize::new(0);
        let result = fetch_in_batches(Platform::Lever, &tenants, 2, 0, |tenant| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { TenantOutcome::Fetched(postings_for(tenant, 1)) }
        })
        .await;
        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
