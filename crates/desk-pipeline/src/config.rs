//! Configuration for the analysis desk pipeline

use crate::error::{DeskError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for pipeline runs
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Maximum writer/critic revision iterations per run
    pub max_revisions: u32,

    /// Number of historical reports retrieved for the informed opinion
    pub retrieval_k: usize,

    /// Market data lookback window in days
    pub lookback_days: i64,

    /// Transport length limit for one notification chunk
    pub notify_limit: usize,

    /// Request timeout for upstream HTTP clients
    pub request_timeout: Duration,

    /// Directory holding the report archive files
    pub archive_dir: PathBuf,

    /// Tiingo API key (market data)
    pub tiingo_api_key: Option<String>,

    /// Serper API key (news and web search)
    pub serper_api_key: Option<String>,

    /// Discord webhook URL for report delivery
    pub discord_webhook_url: Option<String>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            max_revisions: 5,
            retrieval_k: 5,
            lookback_days: 30,
            notify_limit: 2000,
            request_timeout: Duration::from_secs(30),
            archive_dir: PathBuf::from("archive"),
            tiingo_api_key: None,
            serper_api_key: None,
            discord_webhook_url: None,
        }
    }
}

impl DeskConfig {
    /// Create a new configuration builder
    pub fn builder() -> DeskConfigBuilder {
        DeskConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_revisions == 0 {
            return Err(DeskError::Config(
                "max_revisions must be greater than 0".to_string(),
            ));
        }

        if self.retrieval_k == 0 {
            return Err(DeskError::Config(
                "retrieval_k must be greater than 0".to_string(),
            ));
        }

        if self.notify_limit == 0 {
            return Err(DeskError::Config(
                "notify_limit must be greater than 0".to_string(),
            ));
        }

        if self.lookback_days <= 0 {
            return Err(DeskError::Config(
                "lookback_days must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for DeskConfig
#[derive(Debug, Default)]
pub struct DeskConfigBuilder {
    max_revisions: Option<u32>,
    retrieval_k: Option<usize>,
    lookback_days: Option<i64>,
    notify_limit: Option<usize>,
    request_timeout: Option<Duration>,
    archive_dir: Option<PathBuf>,
    tiingo_api_key: Option<String>,
    serper_api_key: Option<String>,
    discord_webhook_url: Option<String>,
}

impl DeskConfigBuilder {
    /// Set the revision-loop iteration budget
    pub fn max_revisions(mut self, max_revisions: u32) -> Self {
        self.max_revisions = Some(max_revisions);
        self
    }

    /// Set the number of reports retrieved per informed opinion
    pub fn retrieval_k(mut self, retrieval_k: usize) -> Self {
        self.retrieval_k = Some(retrieval_k);
        self
    }

    /// Set the market data lookback window in days
    pub fn lookback_days(mut self, lookback_days: i64) -> Self {
        self.lookback_days = Some(lookback_days);
        self
    }

    /// Set the notification chunk length limit
    pub fn notify_limit(mut self, notify_limit: usize) -> Self {
        self.notify_limit = Some(notify_limit);
        self
    }

    /// Set the upstream request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the archive directory
    pub fn archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Set the Tiingo API key
    pub fn tiingo_api_key(mut self, key: impl Into<String>) -> Self {
        self.tiingo_api_key = Some(key.into());
        self
    }

    /// Set the Serper API key
    pub fn serper_api_key(mut self, key: impl Into<String>) -> Self {
        self.serper_api_key = Some(key.into());
        self
    }

    /// Set the Discord webhook URL
    pub fn discord_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.discord_webhook_url = Some(url.into());
        self
    }

    /// Load API keys from environment variables
    ///
    /// Reads `TIINGO_API_KEY`, `SERPER_API_KEY` and `DISCORD_WEBHOOK_URL`;
    /// missing variables leave the corresponding key unset.
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("TIINGO_API_KEY") {
            self.tiingo_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("SERPER_API_KEY") {
            self.serper_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("DISCORD_WEBHOOK_URL") {
            self.discord_webhook_url = Some(url);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DeskConfig> {
        let defaults = DeskConfig::default();

        let config = DeskConfig {
            max_revisions: self.max_revisions.unwrap_or(defaults.max_revisions),
            retrieval_k: self.retrieval_k.unwrap_or(defaults.retrieval_k),
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            notify_limit: self.notify_limit.unwrap_or(defaults.notify_limit),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            archive_dir: self.archive_dir.unwrap_or(defaults.archive_dir),
            tiingo_api_key: self.tiingo_api_key,
            serper_api_key: self.serper_api_key,
            discord_webhook_url: self.discord_webhook_url,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeskConfig::default();
        assert_eq!(config.max_revisions, 5);
        assert_eq!(config.retrieval_k, 5);
        assert_eq!(config.notify_limit, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = DeskConfig::builder()
            .max_revisions(3)
            .lookback_days(14)
            .archive_dir("/tmp/reports")
            .tiingo_api_key("key")
            .build()
            .expect("valid config");

        assert_eq!(config.max_revisions, 3);
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.archive_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.tiingo_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_validation_rejects_zero_revisions() {
        let result = DeskConfig::builder().max_revisions(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_zero_retrieval() {
        let result = DeskConfig::builder().retrieval_k(0).build();
        assert!(result.is_err());
    }
}
