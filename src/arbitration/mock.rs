//! Scripted reasoning backend for tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ArbitrationBackend, ArbitrationError, ArbitrationPrompt};

#[derive(Default)]
/// Replays queued responses in order, then repeats the fallback.
///
/// Every prompt it receives is recorded for assertions.
pub struct ScriptedArbiter {
    queue: Mutex<VecDeque<Result<String, ArbitrationError>>>,
    fallback: Option<Result<String, ArbitrationError>>,
    latency: Option<Duration>,
    prompts: Mutex<Vec<ArbitrationPrompt>>,
}

impl ScriptedArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answers `match` for `index` with `confidence`.
    pub fn matching(index: usize, confidence: f32) -> Self {
        Self::new().always(match_json(index, confidence, "scripted match"))
    }

    /// Always answers `no_match`.
    pub fn rejecting(reason: &str) -> Self {
        Self::new().always(
            serde_json::json!({ "decision": "no_match", "reason": reason }).to_string(),
        )
    }

    /// Queues one raw response.
    pub fn respond(self, raw: impl Into<String>) -> Self {
        self.queue.lock().push_back(Ok(raw.into()));
        self
    }

    /// Queues one failure.
    pub fn fail(self, error: ArbitrationError) -> Self {
        self.queue.lock().push_back(Err(error));
        self
    }

    pub fn always(mut self, raw: impl Into<String>) -> Self {
        self.fallback = Some(Ok(raw.into()));
        self
    }

    /// Sleeps this long before every answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<ArbitrationPrompt> {
        self.prompts.lock().clone()
    }
}

pub fn match_json(index: usize, confidence: f32, rationale: &str) -> String {
    serde_json::json!({
        "decision": "match",
        "index": index,
        "confidence": confidence,
        "rationale": rationale,
    })
    .to_string()
}

#[async_trait]
impl ArbitrationBackend for ScriptedArbiter {
    async fn complete(&self, prompt: &ArbitrationPrompt) -> Result<String, ArbitrationError> {
        self.prompts.lock().push(prompt.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.queue.lock().pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(response) => response,
            None => Err(ArbitrationError::Backend {
                backend: self.name().to_string(),
                message: "script exhausted".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
