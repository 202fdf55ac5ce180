//! Shared test doubles for pipeline tests

use crate::error::Result as DeskResult;
use crate::providers::Notifier;
use async_trait::async_trait;
use desk_core::{AnalysisRequest, Worker, WorkerResult};
use desk_llm::{ChatProvider, EmbeddingProvider, LlmError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Chat provider that replays a scripted sequence of replies
///
/// Replies are consumed in order; once the script runs out, the fallback
/// reply is returned forever. Inputs are recorded for assertions.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    fallback: std::result::Result<String, String>,
    inputs: Mutex<Vec<String>>,
}

impl ScriptedChat {
    /// Always answer with the same reply
    pub fn always(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Ok(reply.to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Err(message.to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Answer with the given replies in order, then repeat the last one
    pub fn sequence(replies: &[&str]) -> Self {
        let fallback = Ok(replies.last().map(|r| r.to_string()).unwrap_or_default());
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            fallback,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Answer with the given replies in order, then fail forever
    pub fn sequence_then_fail(replies: &[&str], message: &str) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            fallback: Err(message.to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Number of generate calls seen so far
    pub fn calls(&self) -> usize {
        self.inputs.lock().expect("lock").len()
    }

    /// Inputs passed to generate, in call order
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedChat {
    async fn generate(&self, _instructions: &str, input: &str) -> Result<String, LlmError> {
        self.inputs.lock().expect("lock").push(input.to_string());
        let next = self
            .replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        next.map_err(LlmError::RequestFailed)
    }

    fn name(&self) -> &str {
        "scripted-chat"
    }
}

/// Deterministic embedder mapping text to ASCII letter frequencies
///
/// Similar texts share letters, so cosine similarity behaves sensibly
/// without a model in the loop.
pub struct LetterEmbedder;

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut counts = [0.0f32; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(counts.to_vec())
    }

    fn name(&self) -> &str {
        "letter-embedder"
    }
}

/// Embedder that always fails
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        Err(LlmError::RequestFailed("embedder offline".to_string()))
    }

    fn name(&self) -> &str {
        "failing-embedder"
    }
}

/// Notifier that records everything sent through it
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> DeskResult<()> {
        self.messages.lock().expect("lock").push(text.to_string());
        Ok(())
    }
}

/// Worker returning a fixed result, counting invocations
pub struct StubWorker {
    name: String,
    result: WorkerResult,
    calls: Mutex<usize>,
}

impl StubWorker {
    pub fn new(name: &str, result: WorkerResult) -> Self {
        Self {
            name: name.to_string(),
            result,
            calls: Mutex::new(0),
        }
    }

    pub fn succeeding(name: &str, output: &str) -> Self {
        Self::new(name, WorkerResult::ok(output))
    }

    pub fn failing(name: &str, error: &str) -> Self {
        Self::new(name, WorkerResult::failure(error))
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("lock")
    }
}

#[async_trait]
impl Worker for StubWorker {
    async fn run(&self, _request: &AnalysisRequest) -> WorkerResult {
        *self.calls.lock().expect("lock") += 1;
        self.result.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
