//! Core abstractions for the analysis desk
//!
//! This crate defines the uniform contract shared by every analysis worker:
//! the [`Worker`] trait, the immutable [`AnalysisRequest`] input, the
//! [`WorkerResult`] return shape, and the critic's [`Verdict`].
//!
//! Workers never surface errors through a separate channel; every failure is
//! folded into a `WorkerResult` with `succeeded = false` so the orchestrator
//! deals with exactly one shape.

pub mod request;
pub mod result;
pub mod worker;

pub use request::AnalysisRequest;
pub use result::{Verdict, WorkerResult};
pub use worker::Worker;
