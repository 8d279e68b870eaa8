// src/web_search/engines.rs
//! Result-page parsers for the supported search engines.

use reqwest::Url;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::html::element_text;

pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    DuckDuckGo,
    Bing,
    Google,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganicResult {
    pub position: usize,
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub domain: String,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 3] = [SearchEngine::DuckDuckGo, SearchEngine::Bing, SearchEngine::Google];

    pub fn id(self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "duckduckgo",
            SearchEngine::Bing => "bing",
            SearchEngine::Google => "google",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "https://html.duckduckgo.com/html/",
            SearchEngine::Bing => "https://www.bing.com/search",
            SearchEngine::Google => "https://www.google.com/search",
        }
    }

    /// Extra query parameters sent alongside `q`.
    pub fn locale_params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            SearchEngine::DuckDuckGo => &[],
            SearchEngine::Bing => &[("setlang", "en")],
            SearchEngine::Google => &[("hl", "en")],
        }
    }

    /// The preferred engine first, then the rest in their usual order.
    pub fn fallback_chain(preferred: SearchEngine) -> Vec<SearchEngine> {
        std::iter::once(preferred)
            .chain(Self::ALL.into_iter().filter(|e| *e != preferred))
            .collect()
    }

    pub fn parse(self, html: &str) -> Vec<OrganicResult> {
        let document = Html::parse_document(html);
        let candidates = match self {
            SearchEngine::DuckDuckGo => parse_duckduckgo(&document),
            SearchEngine::Bing => parse_blocks(&document, "li.b_algo", "h2 a", "h2 a", "p"),
            SearchEngine::Google => parse_blocks(&document, "div.g", "a[href^='http']", "h3", ".VwiC3b"),
        };

        candidates
            .into_iter()
            .filter(|(title, link, _)| !title.is_empty() && link.starts_with("http"))
            .take(MAX_RESULTS)
            .enumerate()
            .map(|(index, (title, link, snippet))| OrganicResult {
                position: index + 1,
                domain: domain_of(&link),
                snippet: if snippet.is_empty() {
                    "No description".to_string()
                } else {
                    snippet
                },
                title,
                link,
            })
            .collect()
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SearchEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchEngine::DuckDuckGo),
            "bing" => Ok(SearchEngine::Bing),
            "google" => Ok(SearchEngine::Google),
            other => anyhow::bail!("Unknown search engine: {}", other),
        }
    }
}

type Candidate = (String, String, String);

fn parse_duckduckgo(document: &Html) -> Vec<Candidate> {
    let (Ok(block), Ok(anchor), Ok(snippet)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    document
        .select(&block)
        .filter_map(|result| {
            let link = result.select(&anchor).next()?;
            let href = unwrap_redirect(link.value().attr("href")?);
            let snippet = result.select(&snippet).next().map(element_text).unwrap_or_default();
            Some((element_text(link), href, snippet))
        })
        .collect()
}

fn parse_blocks(document: &Html, block: &str, link: &str, title: &str, snippet: &str) -> Vec<Candidate> {
    let (Ok(block), Ok(link), Ok(title), Ok(snippet)) = (
        Selector::parse(block),
        Selector::parse(link),
        Selector::parse(title),
        Selector::parse(snippet),
    ) else {
        return Vec::new();
    };

    document
        .select(&block)
        .filter_map(|result| {
            let href = result.select(&link).next()?.value().attr("href")?.to_string();
            let title = result.select(&title).next().map(element_text)?;
            let snippet = result.select(&snippet).next().map(element_text).unwrap_or_default();
            Some((title, href, snippet))
        })
        .collect()
}

/// DuckDuckGo wraps every target in `/l/?uddg=<encoded target>`.
pub fn unwrap_redirect(href: &str) -> String {
    if !href.contains("uddg=") {
        return href.to_string();
    }

    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or_else(|| href.to_string())
}

fn domain_of(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
