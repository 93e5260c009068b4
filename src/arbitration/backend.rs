use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest};
use tracing::{debug, instrument};

use crate::retry::RetryPolicy;

use super::{ArbitrationConfig, ArbitrationError, ArbitrationPrompt};

#[async_trait]
/// External reasoning capability: prompt in, raw completion text out.
pub trait ArbitrationBackend: Send + Sync {
    async fn complete(&self, prompt: &ArbitrationPrompt) -> Result<String, ArbitrationError>;

    fn name(&self) -> &str;
}

/// Chat-completion backend over the multi-provider `genai` client.
///
/// The provider is inferred from the model name (`gpt-*`, `claude-*`, `gemini-*`, ...),
/// with credentials read from the provider's usual environment variable.
pub struct GenaiArbiter {
    client: Client,
    model: String,
    retry: RetryPolicy,
}

impl GenaiArbiter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Backend for `config.model`, with a default `genai` client.
    pub fn from_config(config: &ArbitrationConfig) -> Result<Self, ArbitrationError> {
        let model = config.model.trim();
        if model.is_empty() {
            return Err(ArbitrationError::InvalidConfig {
                reason: "model cannot be empty".to_string(),
            });
        }
        Ok(Self::new(model))
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_once(&self, prompt: &ArbitrationPrompt) -> Result<String, ArbitrationError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(prompt.system.clone()),
            ChatMessage::user(prompt.user.clone()),
        ]);

        let response = self
            .client
            .exec_chat(self.model.as_str(), request, None)
            .await
            .map_err(|e| ArbitrationError::Backend {
                backend: self.model.clone(),
                message: e.to_string(),
            })?;

        response
            .first_text()
            .map(|text| text.to_string())
            .ok_or_else(|| ArbitrationError::MalformedResponse {
                reason: "completion contained no text".to_string(),
            })
    }
}

#[async_trait]
impl ArbitrationBackend for GenaiArbiter {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &ArbitrationPrompt) -> Result<String, ArbitrationError> {
        let text = self
            .retry
            .run("arbitration", ArbitrationError::is_transient, || {
                self.complete_once(prompt)
            })
            .await?;
        debug!(response_len = text.len(), "Arbitration completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
