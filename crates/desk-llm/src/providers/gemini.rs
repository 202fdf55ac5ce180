//! Google Gemini provider implementation
//!
//! Implements both [`ChatProvider`] and [`EmbeddingProvider`] against the
//! Generative Language REST API (`generateContent` / `embedContent`).
//! See: https://ai.google.dev/api/generate-content

use crate::{ChatProvider, EmbeddingProvider, LlmError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for the Generative Language API
    pub api_key: String,

    /// Chat model identifier (e.g., "gemini-2.0-flash")
    pub model: String,

    /// Embedding model identifier (e.g., "embedding-001")
    pub embedding_model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate per call
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a config with default models for the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.0-flash".to_string(),
            embedding_model: "embedding-001".to_string(),
            temperature: 0.1,
            max_output_tokens: 8192,
            timeout_secs: 120,
        }
    }

    /// Override the chat model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Requires `GEMINI_API_KEY`; `GEMINI_MODEL` and `GEMINI_EMBEDDING_MODEL`
    /// override the defaults when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            LlmError::Configuration("GEMINI_API_KEY environment variable not set".to_string())
        })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(model) = std::env::var("GEMINI_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        Ok(config)
    }
}

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration("empty API key".to_string()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// The configured chat model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn map_status_error(&self, status: reqwest::StatusCode, body: String, model: &str) -> LlmError {
        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationFailed,
            429 => LlmError::RateLimitExceeded(body),
            400 => LlmError::InvalidRequest(body),
            404 => LlmError::ModelNotFound(model.to_string()),
            _ => LlmError::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    #[instrument(skip(self, instructions, input), fields(model = %self.config.model))]
    async fn generate(&self, instructions: &str, input: &str) -> Result<String> {
        debug!("Sending generateContent request");

        let request = GenerateContentRequest {
            system_instruction: Some(Content::from_text(instructions)),
            contents: vec![Content::user(input)],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(format!(
                "{GEMINI_API_BASE}/models/{}:generateContent",
                self.config.model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(self.map_status_error(status, body, &self.config.model));
        }

        let response: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::UnexpectedResponse(format!("failed to parse response: {e}"))
        })?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.joined_text())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::UnexpectedResponse(
                "response contained no text candidates".to_string(),
            ));
        }

        debug!(chars = text.len(), "Received generated text");
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    #[instrument(skip(self, text), fields(model = %self.config.embedding_model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedContentRequest {
            model: format!("models/{}", self.config.embedding_model),
            content: Content::from_text(text),
        };

        let response = self
            .client
            .post(format!(
                "{GEMINI_API_BASE}/models/{}:embedContent",
                self.config.embedding_model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(self.map_status_error(status, body, &self.config.embedding_model));
        }

        let response: EmbedContentResponse = response.json().await.map_err(|e| {
            LlmError::UnexpectedResponse(format!("failed to parse response: {e}"))
        })?;

        if response.embedding.values.is_empty() {
            return Err(LlmError::UnexpectedResponse(
                "embedding response was empty".to_string(),
            ));
        }

        Ok(response.embedding.values)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// Gemini-specific request/response types
// These match the Generative Language API format exactly

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn from_text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    fn joined_text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Embedding,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    values: Vec<f32>,
}
