//! Page scraping and summarization

use crate::error::{DeskError, Result};
use async_trait::async_trait;
use desk_llm::ChatProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SUMMARIZER_INSTRUCTIONS: &str = "\
You summarize web articles for a financial news analyst. Produce a short, \
factual summary of the page content below in at most five sentences. Keep \
concrete figures, dates and named entities; drop navigation text, ads and \
boilerplate. If the page holds no substantive article content, say so.";

// Pages can be arbitrarily large; cap what we feed the model.
const MAX_PAGE_CHARS: usize = 12_000;

/// Summary of one scraped page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub title: String,
    pub link: String,
    pub summary: String,
}

/// Provider that turns a URL into a short content summary
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSummarizer: Send + Sync {
    /// Fetch and summarize the page behind a URL
    async fn summarize(&self, url: &str) -> Result<PageSummary>;
}

/// Scraper that fetches a page and summarizes it through a chat provider
pub struct PageScraper {
    client: reqwest::Client,
    chat: Arc<dyn ChatProvider>,
}

impl PageScraper {
    /// Create a new page scraper
    pub fn new(chat: Arc<dyn ChatProvider>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, chat })
    }
}

#[async_trait]
impl PageSummarizer for PageScraper {
    async fn summarize(&self, url: &str) -> Result<PageSummary> {
        debug!(%url, "Scraping page");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DeskError::Api(format!(
                "page fetch returned HTTP {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        let title = extract_title(&html).unwrap_or_else(|| url.to_string());
        let text = strip_markup(&html);
        if text.is_empty() {
            return Err(DeskError::Api(format!("no readable content at {url}")));
        }

        let body: String = text.chars().take(MAX_PAGE_CHARS).collect();
        let summary = self.chat.generate(SUMMARIZER_INSTRUCTIONS, &body).await?;

        Ok(PageSummary {
            title,
            link: url.to_string(),
            summary,
        })
    }
}

/// Case-insensitive substring search for an ASCII needle
///
/// Byte offsets returned here are always char boundaries because the
/// needle is pure ASCII.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Extract the document title, if any
fn extract_title(html: &str) -> Option<String> {
    let start = find_ci(html, "<title")?;
    let open_end = html[start..].find('>')? + start + 1;
    let close = find_ci(&html[open_end..], "</title>")? + open_end;
    let title = html[open_end..close].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Strip tags, scripts and styles from an HTML document
///
/// Deliberately crude: the summarization model tolerates noisy text, so a
/// full HTML parser is not worth the dependency here.
fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 4);
    let mut rest = html;

    while !rest.is_empty() {
        if rest.starts_with('<') {
            let close_tag = if find_ci(rest, "<script").is_some_and(|i| i == 0) {
                Some("</script>")
            } else if find_ci(rest, "<style").is_some_and(|i| i == 0) {
                Some("</style>")
            } else {
                None
            };

            if let Some(end_tag) = close_tag {
                match find_ci(rest, end_tag) {
                    Some(pos) => rest = &rest[pos + end_tag.len()..],
                    None => break,
                }
                continue;
            }

            match rest.find('>') {
                Some(pos) => rest = &rest[pos + 1..],
                None => break,
            }
            continue;
        }

        let chunk_end = rest.find('<').unwrap_or(rest.len());
        out.push_str(&rest[..chunk_end]);
        out.push(' ');
        rest = &rest[chunk_end..];
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_drops_tags_and_scripts() {
        let html = r#"<html><head><title>ACME News</title>
            <script>var x = "noise";</script>
            <style>.a { color: red }</style></head>
            <body><h1>Earnings</h1><p>Revenue rose 12% in Q2.</p></body></html>"#;

        let text = strip_markup(html);
        assert!(text.contains("Earnings"));
        assert!(text.contains("Revenue rose 12% in Q2."));
        assert!(!text.contains("noise"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title> ACME News </title></head><body/></html>";
        assert_eq!(extract_title(html).as_deref(), Some("ACME News"));

        assert!(extract_title("<html><body>no title</body></html>").is_none());
    }
}
