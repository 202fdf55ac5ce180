//! Pipeline orchestrator

use crate::archive::{ReportArchive, ReportStore};
use crate::config::DeskConfig;
use crate::error::{DeskError, Result};
use crate::pipeline::state::revision_loop;
use crate::providers::{
    DiscordNotifier, NewsSearchProvider, Notifier, PageScraper, SerperClient, TiingoClient,
    WebSearchProvider,
};
use crate::workers::{CriticWorker, DataAnalystWorker, JournalistWorker, WriterWorker};
use chrono::NaiveDate;
use desk_core::{AnalysisRequest, Worker};
use desk_llm::{ChatProvider, EmbeddingProvider};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Orchestrator that runs the full report pipeline for one ticker at a time
///
/// A run fans out the research workers, drives the writer/critic loop,
/// archives the final draft and delivers it. Failures are reported through
/// the notifier; a run never panics the process.
pub struct Orchestrator {
    archive: Arc<ReportArchive>,
    data_analyst: Arc<dyn Worker>,
    journalist: Arc<dyn Worker>,
    writer: WriterWorker,
    critic: CriticWorker,
    notifier: Arc<dyn Notifier>,
    max_revisions: u32,
}

impl Orchestrator {
    pub fn new(
        archive: Arc<ReportArchive>,
        data_analyst: Arc<dyn Worker>,
        journalist: Arc<dyn Worker>,
        writer: WriterWorker,
        critic: CriticWorker,
        notifier: Arc<dyn Notifier>,
        max_revisions: u32,
    ) -> Self {
        Self {
            archive,
            data_analyst,
            journalist,
            writer,
            critic,
            notifier,
            max_revisions,
        }
    }

    /// Run the pipeline for one ticker; always yields a deliverable string
    ///
    /// On failure the returned string describes the failure, and that same
    /// text is what gets notified.
    #[instrument(skip(self))]
    pub async fn run(&self, ticker: &str, as_of: NaiveDate) -> String {
        let report = match self.execute(ticker, as_of).await {
            Ok(report) => report,
            Err(e) => {
                warn!(%ticker, error = %e, "Pipeline run failed");
                format!("Analysis for {ticker} failed: {e}")
            }
        };

        if let Err(e) = self.notifier.send(&report).await {
            warn!(%ticker, error = %e, "Report notification failed");
        }

        report
    }

    /// Run the pipeline for a ticker as of today
    pub async fn run_for_ticker(&self, ticker: &str) -> String {
        self.run(ticker, chrono::Utc::now().date_naive()).await
    }

    /// Run the pipeline concurrently for several tickers
    ///
    /// Results come back in input order; one ticker's failure never
    /// affects the others.
    pub async fn run_for_tickers(self: &Arc<Self>, tickers: &[String], as_of: NaiveDate) -> Vec<String> {
        let runs = tickers.iter().map(|ticker| {
            let orchestrator = Arc::clone(self);
            let ticker = ticker.clone();
            async move { orchestrator.run(&ticker, as_of).await }
        });
        futures::future::join_all(runs).await
    }

    async fn execute(&self, ticker: &str, as_of: NaiveDate) -> Result<String> {
        // Historical context is optional; retrieval problems degrade to none.
        let archived_context = match self.archive.informed_opinion(ticker).await {
            Ok(context) => context,
            Err(e) => {
                warn!(%ticker, error = %e, "Informed opinion lookup failed");
                None
            }
        };

        let mut request = AnalysisRequest::new(ticker, as_of);
        if let Some(context) = archived_context.clone() {
            request = request.with_archived_context(context);
        }

        let (data_result, news_result) =
            tokio::join!(self.data_analyst.run(&request), self.journalist.run(&request));

        // Both research tracks must produce output before any writing starts.
        let data_report = data_result.output.ok_or_else(|| {
            DeskError::stage(
                self.data_analyst.name(),
                data_result
                    .error
                    .unwrap_or_else(|| "no output produced".to_string()),
            )
        })?;
        let news_report = news_result.output.ok_or_else(|| {
            DeskError::stage(
                self.journalist.name(),
                news_result
                    .error
                    .unwrap_or_else(|| "no output produced".to_string()),
            )
        })?;

        let outcome = revision_loop(
            &self.writer,
            &self.critic,
            ticker,
            as_of,
            &data_report,
            &news_report,
            archived_context.as_deref(),
            self.max_revisions,
        )
        .await?;

        info!(
            %ticker,
            iterations = outcome.iterations,
            accepted = outcome.verdict.is_pass(),
            "Report finished"
        );

        // The final draft is archived exactly once per run, accepted or not;
        // an archive failure loses history but never the report itself.
        if let Err(e) = self.archive.save_report(ticker, &outcome.draft).await {
            warn!(%ticker, error = %e, "Failed to archive report");
        }

        Ok(outcome.draft)
    }
}

/// Wire a full orchestrator from configuration and model providers
pub async fn build_orchestrator(
    config: &DeskConfig,
    chat: Arc<dyn ChatProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<Orchestrator> {
    config.validate()?;

    let tiingo_key = config
        .tiingo_api_key
        .as_deref()
        .ok_or_else(|| DeskError::Config("missing Tiingo API key".to_string()))?;
    let serper_key = config
        .serper_api_key
        .as_deref()
        .ok_or_else(|| DeskError::Config("missing Serper API key".to_string()))?;
    let webhook_url = config
        .discord_webhook_url
        .as_deref()
        .ok_or_else(|| DeskError::Config("missing Discord webhook URL".to_string()))?;

    let market_data = Arc::new(TiingoClient::new(tiingo_key, config.request_timeout)?);
    let serper = Arc::new(SerperClient::new(serper_key, config.request_timeout)?);
    let scraper = Arc::new(PageScraper::new(Arc::clone(&chat), config.request_timeout)?);
    let notifier = Arc::new(DiscordNotifier::new(
        webhook_url,
        config.notify_limit,
        config.request_timeout,
    )?);

    let store = Arc::new(ReportStore::open(&config.archive_dir).await?);
    let archive = Arc::new(ReportArchive::new(
        store,
        Arc::clone(&chat),
        embedder,
        config.retrieval_k,
    ));

    let data_analyst = Arc::new(DataAnalystWorker::new(
        market_data,
        Arc::clone(&chat),
        config.lookback_days.unsigned_abs(),
    ));
    let news: Arc<dyn NewsSearchProvider> = Arc::clone(&serper) as Arc<dyn NewsSearchProvider>;
    let web: Arc<dyn WebSearchProvider> = serper;
    let journalist = Arc::new(JournalistWorker::new(news, web, scraper, Arc::clone(&chat)));
    let writer = WriterWorker::new(Arc::clone(&chat));
    let critic = CriticWorker::new(chat);

    Ok(Orchestrator::new(
        archive,
        data_analyst,
        journalist,
        writer,
        critic,
        notifier,
        config.max_revisions,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LetterEmbedder, RecordingNotifier, ScriptedChat, StubWorker};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 24).expect("date")
    }

    struct Harness {
        orchestrator: Orchestrator,
        data_analyst: Arc<StubWorker>,
        journalist: Arc<StubWorker>,
        writer_chat: Arc<ScriptedChat>,
        critic_chat: Arc<ScriptedChat>,
        notifier: Arc<RecordingNotifier>,
        dir: tempfile::TempDir,
    }

    async fn harness(
        data_analyst: StubWorker,
        journalist: StubWorker,
        writer_chat: ScriptedChat,
        critic_chat: ScriptedChat,
    ) -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(ReportStore::open(dir.path()).await.expect("open"));
        // The archivist chat is never consulted in these tests because the
        // archive starts empty.
        let archive = Arc::new(ReportArchive::new(
            store,
            Arc::new(ScriptedChat::always("archived context")),
            Arc::new(LetterEmbedder),
            5,
        ));

        let data_analyst = Arc::new(data_analyst);
        let journalist = Arc::new(journalist);
        let writer_chat = Arc::new(writer_chat);
        let critic_chat = Arc::new(critic_chat);
        let notifier = Arc::new(RecordingNotifier::new());

        let orchestrator = Orchestrator::new(
            archive,
            Arc::clone(&data_analyst) as Arc<dyn Worker>,
            Arc::clone(&journalist) as Arc<dyn Worker>,
            WriterWorker::new(Arc::clone(&writer_chat) as Arc<dyn ChatProvider>),
            CriticWorker::new(Arc::clone(&critic_chat) as Arc<dyn ChatProvider>),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            5,
        );

        Harness {
            orchestrator,
            data_analyst,
            journalist,
            writer_chat,
            critic_chat,
            notifier,
            dir,
        }
    }

    async fn archived_reports(dir: &tempfile::TempDir) -> Vec<String> {
        let store = ReportStore::open(dir.path()).await.expect("reopen");
        let len = store.len().await;
        // Read everything back through search is not possible without
        // vectors, so lean on the record count plus a broad search.
        let mut contents = Vec::new();
        if len > 0 {
            let results = store.search(&[1.0; 26], len).await.expect("search");
            contents = results.into_iter().map(|r| r.content).collect();
        }
        contents
    }

    #[tokio::test]
    async fn test_clean_run_writes_once_and_archives_once() {
        let h = harness(
            StubWorker::succeeding("data-analyst", "data report"),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::always("final draft"),
            ScriptedChat::always("PASS"),
        )
        .await;

        let report = h.orchestrator.run("ACME", date()).await;
        assert_eq!(report, "final draft");
        assert_eq!(h.data_analyst.calls(), 1);
        assert_eq!(h.journalist.calls(), 1);
        assert_eq!(h.writer_chat.calls(), 1);
        assert_eq!(h.critic_chat.calls(), 1);
        assert_eq!(h.notifier.messages(), vec!["final draft".to_string()]);

        let archived = archived_reports(&h.dir).await;
        assert_eq!(archived, vec!["final draft".to_string()]);
    }

    #[tokio::test]
    async fn test_persistent_rejection_archives_fifth_draft() {
        let h = harness(
            StubWorker::succeeding("data-analyst", "data report"),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::sequence(&["d1", "d2", "d3", "d4", "d5"]),
            ScriptedChat::always("FAIL\nFeedback: not good enough."),
        )
        .await;

        let report = h.orchestrator.run("ACME", date()).await;
        assert_eq!(report, "d5");
        assert_eq!(h.writer_chat.calls(), 5);
        assert_eq!(h.critic_chat.calls(), 5);

        let archived = archived_reports(&h.dir).await;
        assert_eq!(archived, vec!["d5".to_string()]);
    }

    #[tokio::test]
    async fn test_fail_then_pass_archives_second_draft() {
        let h = harness(
            StubWorker::succeeding("data-analyst", "data report"),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::sequence(&["d1", "d2"]),
            ScriptedChat::sequence(&["FAIL\nFeedback: expand the outlook.", "PASS"]),
        )
        .await;

        let report = h.orchestrator.run("ACME", date()).await;
        assert_eq!(report, "d2");
        assert_eq!(h.writer_chat.calls(), 2);
        assert_eq!(h.critic_chat.calls(), 2);

        let archived = archived_reports(&h.dir).await;
        assert_eq!(archived, vec!["d2".to_string()]);
    }

    #[tokio::test]
    async fn test_research_failure_aborts_before_writing() {
        let h = harness(
            StubWorker::failing("data-analyst", "market data fetch failed: HTTP 500"),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::always("should not be called"),
            ScriptedChat::always("should not be called"),
        )
        .await;

        let report = h.orchestrator.run("ACME", date()).await;
        assert!(report.starts_with("Analysis for ACME failed:"));
        assert!(report.contains("HTTP 500"));
        assert_eq!(h.writer_chat.calls(), 0);
        assert_eq!(h.critic_chat.calls(), 0);

        // The failure still goes out through the notifier
        assert_eq!(h.notifier.messages(), vec![report]);
        assert!(archived_reports(&h.dir).await.is_empty());
    }

    #[tokio::test]
    async fn test_writer_failure_with_no_draft_archives_nothing() {
        let h = harness(
            StubWorker::succeeding("data-analyst", "data report"),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::failing("model offline"),
            ScriptedChat::always("unused"),
        )
        .await;

        let report = h.orchestrator.run("ACME", date()).await;
        assert!(report.starts_with("Analysis for ACME failed:"));
        assert!(archived_reports(&h.dir).await.is_empty());
    }

    #[tokio::test]
    async fn test_writer_failure_after_draft_archives_prior_draft() {
        let h = harness(
            StubWorker::succeeding("data-analyst", "data report"),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::sequence_then_fail(&["d1"], "model offline"),
            ScriptedChat::always("FAIL\nFeedback: revise."),
        )
        .await;

        let report = h.orchestrator.run("ACME", date()).await;
        assert_eq!(report, "d1");

        let archived = archived_reports(&h.dir).await;
        assert_eq!(archived, vec!["d1".to_string()]);
    }

    #[tokio::test]
    async fn test_degraded_data_result_still_reaches_the_writer() {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            "dataRetrievalStatus".to_string(),
            serde_json::json!({ "success": false, "reason": "no trading data in window" }),
        );
        let degraded = desk_core::WorkerResult::ok_with_metadata(
            "No trading data was available for ACME in the window.",
            metadata,
        );

        let h = harness(
            StubWorker::new("data-analyst", degraded),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::always("caveated draft"),
            ScriptedChat::always("PASS"),
        )
        .await;

        let report = h.orchestrator.run("ACME", date()).await;
        assert_eq!(report, "caveated draft");
        assert_eq!(h.writer_chat.calls(), 1);

        // The writer saw the unavailability statement
        let inputs = h.writer_chat.inputs();
        assert!(inputs[0].contains("No trading data was available"));
    }

    #[tokio::test]
    async fn test_multi_ticker_runs_are_independent() {
        let h = harness(
            StubWorker::succeeding("data-analyst", "data report"),
            StubWorker::succeeding("journalist", "news report"),
            ScriptedChat::always("draft"),
            ScriptedChat::always("PASS"),
        )
        .await;

        let orchestrator = Arc::new(h.orchestrator);
        let tickers = vec!["ACME".to_string(), "GLOBEX".to_string()];
        let reports = orchestrator.run_for_tickers(&tickers, date()).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(h.data_analyst.calls(), 2);
        assert_eq!(h.notifier.messages().len(), 2);
    }
}
