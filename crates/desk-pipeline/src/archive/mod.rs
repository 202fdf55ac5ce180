//! Report archive with semantic retrieval
//!
//! The archive keeps every finished report and serves an "informed opinion"
//! to new runs: the most similar past reports are retrieved and condensed
//! into a single paragraph of historical context.

mod store;

pub use store::{ReportRecord, ReportStore};

use crate::error::Result;
use desk_llm::{ChatProvider, EmbeddingProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

const ARCHIVIST_INSTRUCTIONS: &str = "\
You are the archivist of an equity research desk. You are given a set of \
past analyst reports about a stock. Condense them into a single paragraph \
describing how the outlook for the stock has evolved: prior sentiment, \
recurring themes, and any notable reversals. Write in plain prose without \
headers or bullet points. Do not invent facts absent from the reports.";

/// Archive of finished reports with similarity-based recall
pub struct ReportArchive {
    store: Arc<ReportStore>,
    chat: Arc<dyn ChatProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    retrieval_k: usize,
}

impl ReportArchive {
    pub fn new(
        store: Arc<ReportStore>,
        chat: Arc<dyn ChatProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        retrieval_k: usize,
    ) -> Self {
        Self {
            store,
            chat,
            embedder,
            retrieval_k,
        }
    }

    /// Synthesize historical context for a ticker from past reports
    ///
    /// Returns `Ok(None)` when the archive holds nothing relevant or when
    /// retrieval fails; a missing opinion never blocks a run.
    pub async fn informed_opinion(&self, ticker: &str) -> Result<Option<String>> {
        if self.store.is_empty().await {
            debug!(%ticker, "Archive is empty, no informed opinion");
            return Ok(None);
        }

        let query = format!("Recent analyst reports and outlook for {ticker} stock");
        let embedding = match self.embedder.embed(&query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(%ticker, error = %e, "Failed to embed archive query");
                return Ok(None);
            }
        };

        let matches = self.store.search(&embedding, self.retrieval_k).await?;
        if matches.is_empty() {
            return Ok(None);
        }

        let corpus = matches
            .iter()
            .map(|record| {
                format!(
                    "Report on {} from {}:\n{}",
                    record.ticker,
                    record.created_at.format("%Y-%m-%d"),
                    record.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        match self.chat.generate(ARCHIVIST_INSTRUCTIONS, &corpus).await {
            Ok(opinion) => {
                debug!(%ticker, reports = matches.len(), "Synthesized informed opinion");
                Ok(Some(opinion))
            }
            Err(e) => {
                warn!(%ticker, error = %e, "Failed to synthesize informed opinion");
                Ok(None)
            }
        }
    }

    /// Persist a finished report
    ///
    /// The text record is written first and is the source of truth; the
    /// embedding is attached best-effort afterwards. Returns whether the
    /// report ended up searchable.
    pub async fn save_report(&self, ticker: &str, content: &str) -> Result<bool> {
        let id = self.store.append(ticker, content).await?;

        match self.embedder.embed(content).await {
            Ok(embedding) => {
                self.store.attach_embedding(id, embedding).await?;
                info!(%ticker, id, "Report archived with embedding");
                Ok(true)
            }
            Err(e) => {
                warn!(%ticker, id, error = %e, "Report archived without embedding");
                Ok(false)
            }
        }
    }
}
