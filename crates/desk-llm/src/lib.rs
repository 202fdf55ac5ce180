//! Text generation and embedding providers for the analysis desk
//!
//! The pipeline treats text generation as an opaque capability: give a
//! provider role-specific instructions plus a context payload, get text back
//! or an error. Embeddings use the same seam so the archive embeds reports
//! and queries with one provider.

pub mod error;
pub mod provider;
pub mod providers;

pub use error::{LlmError, Result};
pub use provider::{ChatProvider, EmbeddingProvider};
pub use providers::{GeminiConfig, GeminiProvider};
