// src/job_aggregation/recency.rs
//! Posting-date parsing and the "posted within N days" check.
//!
//! Platforms report dates as RFC 3339 strings, bare dates, naive timestamps or
//! epoch milliseconds. Anything unparseable is treated as unknown, and unknown
//! dates are always accepted.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

pub fn parse_posted_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
    }

    if raw.len() >= 12 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse::<i64>().ok().and_then(from_epoch_millis);
    }

    None
}

pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

pub fn is_recent(posted_at: Option<DateTime<Utc>>, window_days: u32) -> bool {
    is_recent_at(posted_at, window_days, Utc::now())
}

pub fn is_recent_at(posted_at: Option<DateTime<Utc>>, window_days: u32, now: DateTime<Utc>) -> bool {
    match posted_at {
        None => true,
        Some(posted) => posted >= now - Duration::days(i64::from(window_days)),
    }
}

/// String form of [`is_recent`]: malformed input counts as missing.
pub fn is_recent_str(raw: Option<&str>, window_days: u32) -> bool {
    is_recent(raw.and_then(parse_posted_at), window_days)
}
