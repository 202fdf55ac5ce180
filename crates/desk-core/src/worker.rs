//! Core Worker trait definition

use crate::{AnalysisRequest, WorkerResult};
use async_trait::async_trait;

/// Core trait implemented by every analysis worker
///
/// A worker performs one analytical sub-task for a single ticker/date pair
/// and returns the uniform [`WorkerResult`] contract. Worker calls are
/// I/O-bound and may suspend; implementations must be safe to invoke from
/// concurrently running pipelines.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Run the worker against one analysis request
    ///
    /// Failures are captured in the returned result rather than raised:
    /// `succeeded = false` with an error message means the stage failed.
    async fn run(&self, request: &AnalysisRequest) -> WorkerResult;

    /// Get the worker's name
    fn name(&self) -> &str;
}
