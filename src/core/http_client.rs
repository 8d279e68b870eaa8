// src/core/http_client.rs
//! Shared outbound HTTP client for tenant boards and search engines.
//!
//! Several boards reject default client identifiers, so every request goes
//! out with a desktop-browser header set and a bounded timeout.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let request = self.client.get(url).header(ACCEPT, ACCEPT_JSON);
        let body = self.send(url, request).await?;
        decode_json(url, &body)
    }

    pub async fn post_json<B, T>(&self, url: &str, payload: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(url)
            .header(ACCEPT, ACCEPT_JSON)
            .json(payload);
        let body = self.send(url, request).await?;
        decode_json(url, &body)
    }

    pub async fn get_html(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let request = self.client.get(url).header(ACCEPT, ACCEPT_HTML).query(query);
        self.send(url, request).await
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        trace!("{} -> {}", url, status);

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    /// A local server that accepts connections and never answers.
    pub async fn silent_listener() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Board {
        name: String,
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_browser_headers_and_decodes_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/board")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .match_header("accept", ACCEPT_JSON)
            .with_status(200)
            .with_body(r#"{"name":"acme"}"#)
            .create_async()
            .await;

        let board: Board = fetcher()
            .get_json(&format!("{}/board", server.url()))
            .await
            .unwrap();

        assert_eq!(board, Board { name: "acme".to_string() });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher()
            .get_json::<Board>(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/board")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = fetcher()
            .get_json::<Board>(&format!("{}/board", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let err = fetcher()
            .get_html("http://127.0.0.1:9/closed", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. } | FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn silent_server_is_a_timeout_error() {
        let addr = test_support::silent_listener().await;
        let url = format!("http://{addr}/board");

        let started = std::time::Instant::now();
        let err = HttpFetcher::new(Duration::from_millis(300))
            .unwrap()
            .get_json::<Board>(&url)
            .await
            .unwrap_err();

        assert!(matches!(&err, FetchError::Timeout { url: failed } if *failed == url), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
