//! Multi-worker equity report pipeline
//!
//! Runs a small analysis desk for one stock at a time: a data analyst and
//! a journalist research in parallel, a writer composes the report, a
//! critic reviews it in a bounded revision loop, and the accepted (or
//! best-effort) report is archived and delivered.
//!
//! ```no_run
//! use desk_llm::GeminiProvider;
//! use desk_pipeline::{DeskConfig, build_orchestrator};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = DeskConfig::builder().with_env_keys().build()?;
//! let gemini = Arc::new(GeminiProvider::from_env()?);
//! let orchestrator = build_orchestrator(&config, gemini.clone(), gemini).await?;
//! let report = orchestrator.run_for_ticker("AAPL").await;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod workers;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{DeskConfig, DeskConfigBuilder};
pub use error::{DeskError, Result};
pub use pipeline::{Orchestrator, build_orchestrator};
