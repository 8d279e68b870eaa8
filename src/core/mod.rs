// src/core/mod.rs
//! Shared infrastructure: configuration, storage, outbound HTTP and caching.

pub mod config_manager;
pub mod database;
pub mod html;
pub mod http_client;
pub mod ttl_cache;

pub use config_manager::ConfigManager;
pub use database::Database;
pub use http_client::{FetchError, HttpFetcher};
pub use ttl_cache::TtlCache;
