//! Uniform worker result contract and the critic's verdict

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform return contract for every worker invocation
///
/// `succeeded = false` always implies `output = None`; the constructors
/// below are the only intended way to build a result, which keeps that
/// invariant by shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResult {
    /// Whether the worker produced usable output
    pub succeeded: bool,

    /// Free-form analysis text on success
    pub output: Option<String>,

    /// Human-readable error description on failure
    pub error: Option<String>,

    /// Observability payload (tool calls, retrieval status, timestamps)
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
}

impl WorkerResult {
    /// Successful result with no metadata
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: Some(output.into()),
            error: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Successful result carrying observability metadata
    pub fn ok_with_metadata(
        output: impl Into<String>,
        metadata: serde_json::Map<String, Value>,
    ) -> Self {
        Self {
            succeeded: true,
            output: Some(output.into()),
            error: None,
            metadata,
        }
    }

    /// Failed result; the output is always absent
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: None,
            error: Some(error.into()),
            metadata: serde_json::Map::new(),
        }
    }

    /// Look up a metadata entry by key
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// The critic's judgment on a report draft
///
/// Produced only by the critic worker. A draft that cannot be unambiguously
/// judged as passing is always a `Fail` (fail-closed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "UPPERCASE")]
pub enum Verdict {
    /// The draft is satisfactory as-is
    Pass,
    /// The draft needs revision; feedback is always present
    Fail {
        /// Actionable revision feedback for the writer
        feedback: String,
    },
}

impl Verdict {
    /// Whether this verdict accepts the draft
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Revision feedback, present only on `Fail`
    pub fn feedback(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail { feedback } => Some(feedback),
        }
    }
}
