//! Report critic

use desk_core::Verdict;
use desk_llm::ChatProvider;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::{instrument, warn};

const CRITIC_INSTRUCTIONS: &str = "\
You are the managing editor of an equity research desk, reviewing a draft \
analyst report against its source material. Check that every claim is \
grounded in the quantitative analysis or the news report, that the draft \
covers both, and that the prose is clear and professional. Respond on the \
first line with exactly PASS or FAIL. If FAIL, follow with a line starting \
with 'Feedback:' listing the specific problems to fix.";

static FEEDBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)feedback:\s*(.+)").expect("valid regex"));

const DEFAULT_FEEDBACK: &str = "No specific feedback provided.";

/// Worker that judges report drafts against their source material
pub struct CriticWorker {
    chat: Arc<dyn ChatProvider>,
}

impl CriticWorker {
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self { chat }
    }

    /// Judge a draft; any ambiguity or error counts as a failure
    #[instrument(skip_all)]
    pub async fn critique(
        &self,
        draft: &str,
        data_report: &str,
        news_report: &str,
        archived_context: Option<&str>,
    ) -> Verdict {
        let mut input = format!(
            "## Draft report\n{draft}\n\n\
             ## Quantitative analysis\n{data_report}\n\n\
             ## News report\n{news_report}\n"
        );
        if let Some(context) = archived_context {
            let _ = write!(input, "\n## Historical context\n{context}\n");
        }

        match self.chat.generate(CRITIC_INSTRUCTIONS, &input).await {
            Ok(response) => parse_verdict(&response),
            Err(e) => {
                warn!(error = %e, "Critic evaluation failed");
                Verdict::Fail {
                    feedback: format!("Critic evaluation failed: {e}"),
                }
            }
        }
    }
}

/// Parse the critic's free-form response into a verdict
///
/// Only an unambiguous PASS passes; everything else fails, with whatever
/// feedback can be salvaged from the response.
fn parse_verdict(response: &str) -> Verdict {
    let first_line = response.trim().lines().next().unwrap_or("").trim();
    if first_line.eq_ignore_ascii_case("PASS") {
        return Verdict::Pass;
    }

    let feedback = FEEDBACK_RE
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string());

    Verdict::Fail { feedback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedChat;

    #[test]
    fn test_clean_pass() {
        assert!(parse_verdict("PASS").is_pass());
        assert!(parse_verdict("  pass  ").is_pass());
        assert!(parse_verdict("PASS\nGreat report.").is_pass());
    }

    #[test]
    fn test_fail_with_feedback() {
        let verdict = parse_verdict("FAIL\nFeedback: the revenue claim is unsourced.");
        assert_eq!(
            verdict.feedback(),
            Some("the revenue claim is unsourced.")
        );
    }

    #[test]
    fn test_feedback_spans_multiple_lines() {
        let verdict = parse_verdict("FAIL\nFeedback: fix A.\nAlso fix B.");
        assert_eq!(verdict.feedback(), Some("fix A.\nAlso fix B."));
    }

    #[test]
    fn test_ambiguous_response_fails_closed() {
        let verdict = parse_verdict("The report looks mostly fine to me.");
        assert!(!verdict.is_pass());
        assert_eq!(verdict.feedback(), Some(DEFAULT_FEEDBACK));

        // PASS not on the first line does not pass
        assert!(!parse_verdict("I would say PASS").is_pass());
        assert!(!parse_verdict("").is_pass());
    }

    #[tokio::test]
    async fn test_chat_error_fails_closed() {
        let chat = Arc::new(ScriptedChat::failing("model offline"));
        let critic = CriticWorker::new(chat);

        let verdict = critic.critique("draft", "data", "news", None).await;
        assert!(!verdict.is_pass());
        assert!(verdict.feedback().expect("feedback").contains("model offline"));
    }
}
