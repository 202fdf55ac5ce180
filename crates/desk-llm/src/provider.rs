//! Provider trait definitions

use crate::Result;
use async_trait::async_trait;

/// Trait for text generation providers
///
/// Implementations wrap a chat-completion service. The pipeline only ever
/// needs "generate text given instructions and context"; conversation
/// history, tool calling and streaming are deliberately out of this seam.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate text from role instructions and a context payload
    ///
    /// # Arguments
    ///
    /// * `instructions` - The system-level role instructions
    /// * `input` - The request-specific context payload
    async fn generate(&self, instructions: &str, input: &str) -> Result<String>;

    /// Get the provider name (e.g., "gemini")
    fn name(&self) -> &str;
}

/// Trait for embedding providers
///
/// The archive must use the same implementation at write time and query
/// time so similarity scores are comparable.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a text into a dense vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the provider name
    fn name(&self) -> &str;
}
