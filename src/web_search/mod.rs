// src/web_search/mod.rs
//! Organic search-result scraping with an engine fallback chain.

pub mod engines;

pub use engines::{OrganicResult, SearchEngine};

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::http_client::HttpFetcher;
use crate::core::ttl_cache::TtlCache;
use crate::job_aggregation::hasher::canonical_hash;

const CACHE_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Arc<[OrganicResult]>,
    pub engine: SearchEngine,
    pub cached: bool,
}

pub struct SearchService {
    http: HttpFetcher,
    cache: TtlCache<(SearchEngine, Arc<[OrganicResult]>)>,
    endpoints: HashMap<SearchEngine, String>,
}

impl SearchService {
    pub fn new(http: HttpFetcher, cache_ttl: Duration) -> Self {
        Self {
            http,
            cache: TtlCache::new(CACHE_CAPACITY, cache_ttl),
            endpoints: HashMap::new(),
        }
    }

    pub fn with_endpoint(mut self, engine: SearchEngine, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(engine, endpoint.into());
        self
    }

    pub async fn search(&self, query: &str, preferred: SearchEngine) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            anyhow::bail!("Missing query parameter");
        }

        let cache_key = canonical_hash(&format!("{}:{}", preferred, query));
        if let Some((engine, results)) = self.cache.get(&cache_key) {
            info!("Search cache hit for '{}' ({})", query, engine);
            return Ok(SearchOutcome {
                results,
                engine,
                cached: true,
            });
        }

        let mut last_error = None;
        for engine in SearchEngine::fallback_chain(preferred) {
            match self.run_engine(engine, query).await {
                Ok(results) if !results.is_empty() => {
                    info!("{} returned {} results for '{}'", engine, results.len(), query);
                    let results: Arc<[OrganicResult]> = Arc::from(results);
                    self.cache.insert(cache_key, (engine, results.clone()));
                    return Ok(SearchOutcome {
                        results,
                        engine,
                        cached: false,
                    });
                }
                Ok(_) => warn!("{} returned no results, trying next engine", engine),
                Err(e) => {
                    warn!("{} failed: {}", engine, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => anyhow!(e).context("All search engines failed"),
            None => anyhow!("All search engines failed"),
        })
    }

    async fn run_engine(&self, engine: SearchEngine, query: &str) -> Result<Vec<OrganicResult>, crate::core::FetchError> {
        let endpoint = self
            .endpoints
            .get(&engine)
            .map(String::as_str)
            .unwrap_or_else(|| engine.endpoint());

        let mut params = vec![("q", query)];
        params.extend_from_slice(engine.locale_params());

        let html = self.http.get_html(endpoint, &params).await?;
        Ok(engine.parse(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const BING_PAGE: &str = r#"<li class="b_algo"><h2><a href="https://serde.rs/">Serde</a></h2><p>Serialization framework.</p></li>"#;

    fn service(server: &mockito::ServerGuard) -> SearchService {
        let http = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        SearchService::new(http, Duration::from_secs(3600))
            .with_endpoint(SearchEngine::DuckDuckGo, format!("{}/ddg", server.url()))
            .with_endpoint(SearchEngine::Bing, format!("{}/bing", server.url()))
            .with_endpoint(SearchEngine::Google, format!("{}/google", server.url()))
    }

    #[tokio::test]
    async fn falls_through_failing_and_empty_engines() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/ddg").match_query(Matcher::Any).with_status(503).create_async().await;
        server
            .mock("GET", "/bing")
            .match_query(Matcher::UrlEncoded("q".into(), "serde".into()))
            .with_status(200)
            .with_body(BING_PAGE)
            .expect(1)
            .create_async()
            .await;

        let service = service(&server);
        let first = service.search("serde", SearchEngine::DuckDuckGo).await.unwrap();
        assert_eq!(first.engine, SearchEngine::Bing);
        assert!(!first.cached);
        assert_eq!(first.results[0].link, "https://serde.rs/");

        let second = service.search("  serde ", SearchEngine::DuckDuckGo).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.engine, SearchEngine::Bing);
    }

    #[tokio::test]
    async fn all_engines_failing_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        for path in ["/ddg", "/bing"] {
            server.mock("GET", path).match_query(Matcher::Any).with_status(500).create_async().await;
        }
        server
            .mock("GET", "/google")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html><body>captcha</body></html>")
            .create_async()
            .await;

        let err = service(&server).search("rust", SearchEngine::Google).await.unwrap_err();
        assert!(err.to_string().contains("All search engines failed"));
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let server = mockito::Server::new_async().await;
        assert!(service(&server).search("   ", SearchEngine::Bing).await.is_err());
    }
}
