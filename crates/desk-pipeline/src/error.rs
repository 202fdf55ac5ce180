//! Error types for pipeline operations

use thiserror::Error;

/// Pipeline-specific errors
#[derive(Debug, Error)]
pub enum DeskError {
    /// Upstream API request failed
    #[error("API error: {0}")]
    Api(String),

    /// Data not available for the requested ticker/window
    #[error("data not available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// A pipeline stage failed and the run was aborted
    #[error("{stage} stage failed: {reason}")]
    StageFailed { stage: String, reason: String },

    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error from the archive
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text generation or embedding error
    #[error("LLM error: {0}")]
    Llm(#[from] desk_llm::LlmError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Report archive error
    #[error("archive error: {0}")]
    Archive(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DeskError {
    /// Build a stage-failure error for the orchestrator's abort paths
    pub fn stage(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, DeskError>;
