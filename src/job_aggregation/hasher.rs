// src/job_aggregation/hasher.rs
//! Dedup key for job URLs.
//!
//! A 32-bit shift-and-subtract string hash over UTF-16 code units, rendered as
//! lowercase hex of its absolute value. Cheap enough to run on every candidate
//! posting; collisions between distinct URLs are possible and tolerated.

pub fn canonical_hash(url: &str) -> String {
    let normalized = url.trim().to_lowercase();

    let mut hash: i32 = 0;
    for unit in normalized.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }

    // i32::MIN has no positive i32 counterpart
    format!("{:x}", i64::from(hash).abs())
}
