use crate::prompt::system_prompt;
use ledgerchat_core::{Message, PipelineError, Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Sends one question to the language model and returns its raw reply.
///
/// Exactly one attempt is made per question. Failures are reported, never
/// retried.
pub struct QueryTranslator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl QueryTranslator {
    /// Create a translator with deterministic sampling and no timeout.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            timeout: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per model reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Give up on the model after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn request(&self, message: &str) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system_prompt()), Message::user(message)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Translate a question into the model's raw reply text.
    pub async fn translate(&self, message: &str) -> Result<String, PipelineError> {
        if message.trim().is_empty() {
            return Err(PipelineError::EmptyMessage);
        }

        let call = self.provider.complete(self.request(message));
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                warn!(provider = %self.provider.name(), after_secs = limit.as_secs(), "Model call timed out");
                PipelineError::TranslationTimeout {
                    after_secs: limit.as_secs(),
                }
            })?,
            None => call.await,
        };

        let response = response.map_err(|e| {
            warn!(provider = %self.provider.name(), error = %e, "Model call failed");
            PipelineError::TranslationFailure(e)
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model usage"
            );
        }

        let raw = response.message.content.trim().to_string();
        debug!(model = %response.model, reply = %raw, "Model reply");
        Ok(raw)
    }
}
