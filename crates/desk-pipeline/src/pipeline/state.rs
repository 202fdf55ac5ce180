//! Writer/critic revision loop

use crate::error::{DeskError, Result};
use crate::workers::{CriticWorker, WriterWorker};
use chrono::NaiveDate;
use desk_core::Verdict;
use tracing::{debug, info};

/// Final state of a revision loop
#[derive(Debug)]
pub struct LoopOutcome {
    /// The last draft produced, kept even when the critic never passed it
    pub draft: String,
    /// The verdict on the final draft
    pub verdict: Verdict,
    /// Number of write/critique rounds executed
    pub iterations: u32,
}

enum LoopStage {
    Writing { feedback: Option<String> },
    Critiquing { draft: String },
    Done(LoopOutcome),
}

/// Run the bounded writer/critic loop
///
/// Each round writes a draft and has it critiqued; a FAIL feeds the
/// critic's objections into the next round. The loop ends on the first
/// PASS or after `max_revisions` rounds, whichever comes first. A writer
/// failure ends the loop: with the previous draft if one exists, as an
/// error otherwise.
pub async fn revision_loop(
    writer: &WriterWorker,
    critic: &CriticWorker,
    ticker: &str,
    as_of: NaiveDate,
    data_report: &str,
    news_report: &str,
    archived_context: Option<&str>,
    max_revisions: u32,
) -> Result<LoopOutcome> {
    let mut iterations = 0u32;
    let mut previous: Option<(String, Verdict)> = None;
    let mut stage = LoopStage::Writing { feedback: None };

    loop {
        stage = match stage {
            LoopStage::Writing { feedback } => {
                iterations += 1;
                debug!(%ticker, iteration = iterations, "Writing draft");

                let result = writer
                    .write_report(
                        ticker,
                        as_of,
                        data_report,
                        news_report,
                        archived_context,
                        feedback.as_deref(),
                    )
                    .await;

                match result.output {
                    Some(draft) => LoopStage::Critiquing { draft },
                    None => {
                        let reason = result
                            .error
                            .unwrap_or_else(|| "writer returned no draft".to_string());
                        // Fall back to the best draft we already have.
                        match previous.take() {
                            Some((draft, verdict)) => LoopStage::Done(LoopOutcome {
                                draft,
                                verdict,
                                iterations: iterations - 1,
                            }),
                            None => return Err(DeskError::stage("writer", reason)),
                        }
                    }
                }
            }

            LoopStage::Critiquing { draft } => {
                let verdict = critic
                    .critique(&draft, data_report, news_report, archived_context)
                    .await;

                match verdict {
                    Verdict::Pass => {
                        info!(%ticker, iteration = iterations, "Draft accepted");
                        LoopStage::Done(LoopOutcome {
                            draft,
                            verdict: Verdict::Pass,
                            iterations,
                        })
                    }
                    Verdict::Fail { feedback } if iterations < max_revisions => {
                        debug!(%ticker, iteration = iterations, %feedback, "Draft rejected, revising");
                        previous = Some((
                            draft,
                            Verdict::Fail {
                                feedback: feedback.clone(),
                            },
                        ));
                        LoopStage::Writing {
                            feedback: Some(feedback),
                        }
                    }
                    verdict @ Verdict::Fail { .. } => {
                        info!(%ticker, iterations, "Revision budget exhausted, keeping last draft");
                        LoopStage::Done(LoopOutcome {
                            draft,
                            verdict,
                            iterations,
                        })
                    }
                }
            }

            LoopStage::Done(outcome) => return Ok(outcome),
        };
    }
}
