//! Outbound notification channel

use crate::error::{DeskError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

/// Outbound delivery channel for finished reports
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a report, splitting it into chunks when needed
    async fn send(&self, text: &str) -> Result<()>;
}

/// Split a message into chunks no longer than `max_len` characters
///
/// Prefers breaking on the last newline inside the window, then on the last
/// space; a single unbroken word longer than the limit is the only case
/// that breaks mid-word. Chunks are trimmed and empty chunks dropped.
pub fn split_message(message: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = message.chars().collect();
    if chars.len() <= max_len {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut position = 0;

    while position < chars.len() {
        let mut end = (position + max_len).min(chars.len());
        let mut broke_on_whitespace = false;

        if end < chars.len() {
            let window = &chars[position..end];
            if let Some(offset) = window.iter().rposition(|&c| c == '\n') {
                end = position + offset;
                broke_on_whitespace = true;
            } else if let Some(offset) = window.iter().rposition(|&c| c == ' ') {
                end = position + offset;
                broke_on_whitespace = true;
            }
        }

        let chunk: String = chars[position..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        // Skip the break character itself; a hard break inside an unbroken
        // word consumes no separator.
        position = if broke_on_whitespace { end + 1 } else { end };
    }

    chunks
}

/// Discord webhook notifier
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
    max_len: usize,
}

impl DiscordNotifier {
    /// Create a new Discord notifier
    pub fn new(
        webhook_url: impl Into<String>,
        max_len: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if webhook_url.is_empty() {
            return Err(DeskError::Config("empty Discord webhook URL".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            webhook_url,
            max_len,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let chunks = split_message(text, self.max_len);
        let total = chunks.len();

        // A chunk that fails to deliver is logged and skipped; later
        // chunks are still attempted.
        for (index, chunk) in chunks.iter().enumerate() {
            let payload = json!({ "content": chunk });

            match self
                .client
                .post(&self.webhook_url)
                .json(&payload)
                .send()
                .await
            {
                Ok(response) if !response.status().is_success() => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    error!(chunk = index + 1, total, %status, %body, "Failed to deliver report chunk");
                }
                Ok(_) => {}
                Err(e) => {
                    error!(chunk = index + 1, total, error = %e, "Failed to deliver report chunk");
                }
            }
        }

        info!(chunks = total, "Report delivered to Discord");
        Ok(())
    }
}
