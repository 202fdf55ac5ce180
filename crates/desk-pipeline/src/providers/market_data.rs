//! Market data provider over the Tiingo end-of-day API

use crate::error::{DeskError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const TIINGO_API_BASE: &str = "https://api.tiingo.com/tiingo/daily";

/// One daily OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Provider of historical daily market data
///
/// An empty vector means the window held no trading data (weekends,
/// holidays, unknown ticker); transport failures surface as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch daily bars for a ticker over an inclusive date window
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
    -> Result<Vec<PricePoint>>;
}

/// Tiingo REST client
pub struct TiingoClient {
    client: reqwest::Client,
    api_key: String,
}

impl TiingoClient {
    /// Create a new Tiingo client
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

/// Raw Tiingo price row; adjusted fields are preferred when present
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiingoBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    adj_open: Option<f64>,
    adj_high: Option<f64>,
    adj_low: Option<f64>,
    adj_close: Option<f64>,
}

impl TiingoBar {
    fn into_price_point(self) -> Option<PricePoint> {
        // Tiingo dates look like "2026-07-24T00:00:00.000Z"
        let date = NaiveDate::parse_from_str(self.date.get(..10)?, "%Y-%m-%d").ok()?;
        Some(PricePoint {
            date,
            open: self.adj_open.unwrap_or(self.open),
            high: self.adj_high.unwrap_or(self.high),
            low: self.adj_low.unwrap_or(self.low),
            close: self.adj_close.unwrap_or(self.close),
            volume: self.volume,
        })
    }
}

#[async_trait]
impl MarketDataProvider for TiingoClient {
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let ticker = ticker.to_uppercase();
        debug!(%ticker, %start, %end, "Fetching Tiingo daily prices");

        let response = self
            .client
            .get(format!("{TIINGO_API_BASE}/{ticker}/prices"))
            .query(&[
                ("startDate", start.format("%Y-%m-%d").to_string()),
                ("endDate", end.format("%Y-%m-%d").to_string()),
            ])
            .header("Authorization", format!("Token {}", self.api_key))
            .send()
            .await?;

        // Unknown tickers come back as 404; treat that as an empty window
        // rather than a transport failure, matching the empty-list contract.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeskError::Api(format!(
                "Tiingo returned HTTP {status}: {body}"
            )));
        }

        let bars: Vec<TiingoBar> = response.json().await?;
        let points: Vec<PricePoint> = bars
            .into_iter()
            .filter_map(TiingoBar::into_price_point)
            .collect();

        debug!(%ticker, points = points.len(), "Tiingo fetch complete");
        Ok(points)
    }
}
