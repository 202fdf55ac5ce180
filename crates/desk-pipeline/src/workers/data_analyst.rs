//! Quantitative data-analysis worker

use crate::providers::{MarketDataProvider, PricePoint};
use async_trait::async_trait;
use chrono::Days;
use desk_core::{AnalysisRequest, Worker, WorkerResult};
use desk_llm::ChatProvider;
use serde_json::json;
use std::sync::Arc;
use tracing::{instrument, warn};

const DATA_ANALYST_INSTRUCTIONS: &str = "\
You are a quantitative analyst on an equity research desk. You are given \
daily OHLCV price data for a stock. Write a concise technical analysis of \
the period: overall trend, notable moves with dates, volatility, and volume \
behavior. Ground every claim in the numbers provided and mention concrete \
figures. Do not speculate beyond the data.";

/// Worker that analyzes recent daily price history
pub struct DataAnalystWorker {
    market_data: Arc<dyn MarketDataProvider>,
    chat: Arc<dyn ChatProvider>,
    lookback_days: u64,
}

impl DataAnalystWorker {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        chat: Arc<dyn ChatProvider>,
        lookback_days: u64,
    ) -> Self {
        Self {
            market_data,
            chat,
            lookback_days,
        }
    }
}

fn format_price_table(points: &[PricePoint]) -> String {
    let mut table = String::from("date,open,high,low,close,volume\n");
    for p in points {
        table.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2},{}\n",
            p.date, p.open, p.high, p.low, p.close, p.volume
        ));
    }
    table
}

#[async_trait]
impl Worker for DataAnalystWorker {
    #[instrument(skip(self, request), fields(ticker = %request.ticker))]
    async fn run(&self, request: &AnalysisRequest) -> WorkerResult {
        let end = request.as_of;
        let Some(start) = end.checked_sub_days(Days::new(self.lookback_days)) else {
            return WorkerResult::failure(format!(
                "analysis window underflows the calendar before {end}"
            ));
        };

        let points = match self.market_data.fetch(&request.ticker, start, end).await {
            Ok(points) => points,
            Err(e) => {
                warn!(error = %e, "Market data fetch failed");
                return WorkerResult::failure(format!("market data fetch failed: {e}"));
            }
        };

        // An empty trading window is a finding, not a failure; report it
        // without spending a model call.
        if points.is_empty() {
            let mut metadata = serde_json::Map::new();
            metadata.insert("toolCalls".to_string(), json!(["market_data.fetch"]));
            metadata.insert(
                "dataRetrievalStatus".to_string(),
                json!({ "success": false, "reason": "no trading data in window" }),
            );
            return WorkerResult::ok_with_metadata(
                format!(
                    "No trading data was available for {} between {start} and {end}. \
                     The ticker may be delisted, unknown, or untraded in this window.",
                    request.ticker
                ),
                metadata,
            );
        }

        let input = format!(
            "Ticker: {}\nWindow: {start} to {end}\n\n{}",
            request.ticker,
            format_price_table(&points)
        );

        match self.chat.generate(DATA_ANALYST_INSTRUCTIONS, &input).await {
            Ok(analysis) => {
                let mut metadata = serde_json::Map::new();
                metadata.insert("toolCalls".to_string(), json!(["market_data.fetch"]));
                metadata.insert(
                    "dataRetrievalStatus".to_string(),
                    json!({ "success": true, "pointCount": points.len() }),
                );
                WorkerResult::ok_with_metadata(analysis, metadata)
            }
            Err(e) => {
                warn!(error = %e, "Data analysis generation failed");
                WorkerResult::failure(format!("data analysis generation failed: {e}"))
            }
        }
    }

    fn name(&self) -> &str {
        "data-analyst"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use crate::providers::MockMarketDataProvider;
    use crate::testing::ScriptedChat;
    use chrono::NaiveDate;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("ACME", NaiveDate::from_ymd_opt(2026, 7, 24).expect("date"))
    }

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2026, 7, day).expect("date"),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 10_000,
        }
    }

    #[tokio::test]
    async fn test_analysis_of_available_data() {
        let mut market_data = MockMarketDataProvider::new();
        market_data
            .expect_fetch()
            .returning(|_, _, _| Ok(vec![point(20, 100.0), point(21, 104.0)]));

        let chat = Arc::new(ScriptedChat::always("Prices trended up."));
        let worker = DataAnalystWorker::new(Arc::new(market_data), chat.clone(), 30);

        let result = worker.run(&request()).await;
        assert!(result.succeeded);
        assert_eq!(result.output.as_deref(), Some("Prices trended up."));
        assert_eq!(
            result.metadata_value("dataRetrievalStatus"),
            Some(&json!({ "success": true, "pointCount": 2 }))
        );
        assert_eq!(
            result.metadata_value("toolCalls"),
            Some(&json!(["market_data.fetch"]))
        );

        // The model saw the actual closing prices
        let inputs = chat.inputs();
        assert!(inputs[0].contains("104.00"));
    }

    #[tokio::test]
    async fn test_empty_window_degrades_without_model_call() {
        let mut market_data = MockMarketDataProvider::new();
        market_data.expect_fetch().returning(|_, _, _| Ok(vec![]));

        let chat = Arc::new(ScriptedChat::always("should not be called"));
        let worker = DataAnalystWorker::new(Arc::new(market_data), chat.clone(), 30);

        let result = worker.run(&request()).await;
        assert!(result.succeeded);
        assert!(result.output.as_ref().expect("output").contains("No trading data"));
        assert_eq!(
            result.metadata_value("dataRetrievalStatus").expect("status")["success"],
            json!(false)
        );
        assert_eq!(chat.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_fails_the_worker() {
        let mut market_data = MockMarketDataProvider::new();
        market_data
            .expect_fetch()
            .returning(|_, _, _| Err(DeskError::Api("HTTP 500".to_string())));

        let chat = Arc::new(ScriptedChat::always("unused"));
        let worker = DataAnalystWorker::new(Arc::new(market_data), chat, 30);

        let result = worker.run(&request()).await;
        assert!(!result.succeeded);
        assert!(result.output.is_none());
        assert!(result.error.expect("error").contains("HTTP 500"));
    }
}
