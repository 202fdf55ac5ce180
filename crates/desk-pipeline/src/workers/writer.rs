//! Report writer

use chrono::NaiveDate;
use desk_core::WorkerResult;
use desk_llm::ChatProvider;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{instrument, warn};

const WRITER_INSTRUCTIONS: &str = "\
You are the lead writer on an equity research desk. You are given a \
quantitative analysis, a news report, and optionally historical context and \
revision feedback for one stock. Compose a polished analyst report: an \
opening summary, the data picture, the news picture, and a closing outlook. \
Reconcile the inputs rather than repeating them. When revision feedback is \
present, address every point it raises. Write prose, not bullet lists.";

/// Worker that composes the final analyst report from upstream material
pub struct WriterWorker {
    chat: Arc<dyn ChatProvider>,
}

impl WriterWorker {
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self { chat }
    }

    /// Compose (or revise) a report draft
    ///
    /// `feedback` is present on revision rounds and carries the critic's
    /// objections to the previous draft.
    #[instrument(skip_all, fields(%ticker, revising = feedback.is_some()))]
    pub async fn write_report(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        data_report: &str,
        news_report: &str,
        archived_context: Option<&str>,
        feedback: Option<&str>,
    ) -> WorkerResult {
        let mut input = format!(
            "Ticker: {ticker}\nAs of: {as_of}\n\n\
             ## Quantitative analysis\n{data_report}\n\n\
             ## News report\n{news_report}\n"
        );
        if let Some(context) = archived_context {
            let _ = write!(input, "\n## Historical context\n{context}\n");
        }
        if let Some(feedback) = feedback {
            let _ = write!(input, "\n## Revision feedback\n{feedback}\n");
        }

        match self.chat.generate(WRITER_INSTRUCTIONS, &input).await {
            Ok(draft) => WorkerResult::ok(draft),
            Err(e) => {
                warn!(error = %e, "Draft generation failed");
                WorkerResult::failure(format!("draft generation failed: {e}"))
            }
        }
    }
}
