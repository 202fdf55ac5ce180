//! News research worker

use crate::providers::{NewsSearchProvider, PageSummarizer, WebSearchProvider};
use async_trait::async_trait;
use desk_core::{AnalysisRequest, Worker, WorkerResult};
use desk_llm::ChatProvider;
use serde_json::json;
use std::sync::Arc;
use tracing::{instrument, warn};

const JOURNALIST_INSTRUCTIONS: &str = "\
You are a financial journalist on an equity research desk. You are given \
recent news headlines and page summaries about a stock. Write a concise \
news report: the main storylines, their likely relevance to the stock, and \
overall news sentiment. Attribute claims to their source headline. Do not \
invent events absent from the material.";

// How many search hits get their page scraped and summarized
const MAX_SCRAPED_PAGES: usize = 3;

// How many web results feed the background section
const MAX_BACKGROUND_HITS: usize = 3;

/// Worker that gathers and digests recent news coverage
pub struct JournalistWorker {
    news: Arc<dyn NewsSearchProvider>,
    web: Arc<dyn WebSearchProvider>,
    summarizer: Arc<dyn PageSummarizer>,
    chat: Arc<dyn ChatProvider>,
}

impl JournalistWorker {
    pub fn new(
        news: Arc<dyn NewsSearchProvider>,
        web: Arc<dyn WebSearchProvider>,
        summarizer: Arc<dyn PageSummarizer>,
        chat: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            news,
            web,
            summarizer,
            chat,
        }
    }

    /// Broad web search for analyst commentary; empty on any failure
    async fn background(&self, ticker: &str) -> Vec<String> {
        let query = format!("{ticker} stock analysis outlook");
        match self.web.search(&query).await {
            Ok(hits) => hits
                .into_iter()
                .take(MAX_BACKGROUND_HITS)
                .map(|hit| format!("{}: {}", hit.title, hit.snippet))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Background web search failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Worker for JournalistWorker {
    #[instrument(skip(self, request), fields(ticker = %request.ticker))]
    async fn run(&self, request: &AnalysisRequest) -> WorkerResult {
        let query = format!("{} stock news", request.ticker);
        let hits = match self.news.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "News search failed");
                return WorkerResult::failure(format!("news search failed: {e}"));
            }
        };

        // A quiet news window is a finding, not a failure.
        if hits.is_empty() {
            let mut metadata = serde_json::Map::new();
            metadata.insert("toolCalls".to_string(), json!(["news.search"]));
            metadata.insert(
                "newsRetrievalStatus".to_string(),
                json!({ "success": false, "reason": "no recent news found" }),
            );
            return WorkerResult::ok_with_metadata(
                format!(
                    "No recent news coverage was found for {}. The stock appears \
                     to be out of the news cycle.",
                    request.ticker
                ),
                metadata,
            );
        }

        let mut tool_calls = vec!["news.search".to_string()];
        let mut sections = Vec::new();
        let mut scraped = 0usize;
        for hit in &hits {
            if scraped >= MAX_SCRAPED_PAGES {
                sections.push(format!("Headline: {}\nSnippet: {}", hit.title, hit.snippet));
                continue;
            }
            // A page that will not scrape still contributes its headline.
            match self.summarizer.summarize(&hit.link).await {
                Ok(page) => {
                    scraped += 1;
                    tool_calls.push("page.summarize".to_string());
                    sections.push(format!(
                        "Headline: {}\nSource: {}\nSummary: {}",
                        hit.title, page.link, page.summary
                    ));
                }
                Err(e) => {
                    warn!(link = %hit.link, error = %e, "Page summarization failed");
                    sections.push(format!("Headline: {}\nSnippet: {}", hit.title, hit.snippet));
                }
            }
        }

        let background = self.background(&request.ticker).await;
        tool_calls.push("web.search".to_string());
        if !background.is_empty() {
            sections.push(format!("Background:\n{}", background.join("\n")));
        }

        let input = format!(
            "Ticker: {}\nAs of: {}\n\n{}",
            request.ticker,
            request.as_of,
            sections.join("\n\n")
        );

        match self.chat.generate(JOURNALIST_INSTRUCTIONS, &input).await {
            Ok(report) => {
                let mut metadata = serde_json::Map::new();
                metadata.insert("toolCalls".to_string(), json!(tool_calls));
                metadata.insert(
                    "newsRetrievalStatus".to_string(),
                    json!({
                        "success": true,
                        "articlesFound": hits.len(),
                        "scrapedCount": scraped,
                    }),
                );
                metadata.insert(
                    "sources".to_string(),
                    json!(hits.iter().map(|h| h.link.clone()).collect::<Vec<_>>()),
                );
                WorkerResult::ok_with_metadata(report, metadata)
            }
            Err(e) => {
                warn!(error = %e, "News report generation failed");
                WorkerResult::failure(format!("news report generation failed: {e}"))
            }
        }
    }

    fn name(&self) -> &str {
        "journalist"
    }
}
