//! News and web search providers over the Serper API

use crate::error::{DeskError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const SERPER_NEWS_URL: &str = "https://google.serper.dev/news";
const SERPER_WEB_URL: &str = "https://google.serper.dev/search";

/// One search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Provider of recent news search results
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSearchProvider: Send + Sync {
    /// Search news articles for a free-form query
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Provider of general web search results
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Search the web for a free-form query
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Serper.dev client implementing both search providers
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
}

impl SerperClient {
    /// Create a new Serper client
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    async fn post_query(&self, url: &str, query: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeskError::Api(format!(
                "Serper returned HTTP {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct SerperHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

fn parse_hits(value: &serde_json::Value, key: &str) -> Vec<SearchHit> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let hit: SerperHit = serde_json::from_value(item.clone()).ok()?;
                    if hit.link.is_empty() {
                        return None;
                    }
                    Some(SearchHit {
                        title: hit.title,
                        link: hit.link,
                        snippet: hit.snippet,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl NewsSearchProvider for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        debug!(%query, "Serper news search");
        let value = self.post_query(SERPER_NEWS_URL, query).await?;
        Ok(parse_hits(&value, "news"))
    }
}

#[async_trait]
impl WebSearchProvider for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        debug!(%query, "Serper web search");
        let value = self.post_query(SERPER_WEB_URL, query).await?;
        Ok(parse_hits(&value, "organic"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_news_hits() {
        let value = json!({
            "news": [
                {"title": "ACME beats estimates", "link": "https://example.com/a", "snippet": "Q2 results"},
                {"title": "no link, dropped", "snippet": "ignored"}
            ]
        });

        let hits = parse_hits(&value, "news");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "ACME beats estimates");
        assert_eq!(hits[0].link, "https://example.com/a");
    }

    #[test]
    fn test_parse_missing_section() {
        let value = json!({"searchParameters": {"q": "ACME"}});
        assert!(parse_hits(&value, "organic").is_empty());
    }
}
