//! Immutable input passed to every worker call

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Input to a single worker invocation
///
/// One request is built per pipeline run and shared read-only between the
/// concurrently executing workers of that run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Stock ticker symbol the run analyzes
    pub ticker: String,

    /// The date the analysis is anchored to
    pub as_of: NaiveDate,

    /// Synthesized opinion from previously archived reports, if any exist
    pub archived_context: Option<String>,
}

impl AnalysisRequest {
    /// Create a request with no archived context
    pub fn new(ticker: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            as_of,
            archived_context: None,
        }
    }

    /// Attach archived context from the report archive
    pub fn with_archived_context(mut self, context: impl Into<String>) -> Self {
        self.archived_context = Some(context.into());
        self
    }
}
