//! The tax assistant agent.
//!
//! `TaxAssistant` runs one conversational turn at a time: it records the
//! user's message, looks up matching tax facts, builds a fresh system
//! instruction around them and streams the model's reply back into the
//! transcript.

use super::backend::{BackendError, ChatBackend, ChatRequest, OpenAiBackend};
use super::prompt;
use crate::credential::Credential;
use crate::facts::FactStore;
use crate::transcript::Transcript;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from a conversational turn.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// No credential: the turn was aborted before anything was recorded.
    #[error("No API key configured - add your OpenAI API key to continue")]
    MissingCredential,

    /// The outbound call failed. The user message stays in the transcript.
    #[error("Completion failed: {0}")]
    Completion(#[from] BackendError),
}

/// Configuration for the assistant.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// The model to use (defaults to gpt-3.5-turbo).
    pub model: String,

    /// OpenAI-compatible endpoint root. `None` means api.openai.com.
    pub base_url: Option<String>,

    /// Temperature for generation. Provider default when unset.
    pub temperature: Option<f32>,

    /// Maximum tokens for replies. Provider default when unset.
    pub max_tokens: Option<usize>,

    /// Bound on the whole request including the stream. Unbounded when unset.
    pub timeout: Option<Duration>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: openai::DEFAULT_MODEL.to_string(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            timeout: None,
        }
    }
}

impl AssistantConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The OpenAI backend this configuration describes.
    pub fn openai_backend(&self) -> OpenAiBackend {
        let mut backend = OpenAiBackend::new();
        if let Some(ref base_url) = self.base_url {
            backend = backend.with_base_url(base_url);
        }
        if let Some(timeout) = self.timeout {
            backend = backend.with_timeout(timeout);
        }
        backend
    }
}

/// A completed assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The full reply, as appended to the transcript.
    pub text: String,

    /// How many fact entries matched the user's message.
    pub fact_hits: usize,
}

/// The Canadian tax assistant.
pub struct TaxAssistant {
    backend: Box<dyn ChatBackend>,
    config: AssistantConfig,
    facts: FactStore,
}

impl TaxAssistant {
    /// Create an assistant talking to OpenAI as described by `config`.
    pub fn new(config: AssistantConfig) -> Self {
        let backend = config.openai_backend();
        Self::with_backend(config, backend)
    }

    /// Create an assistant with a custom completion backend.
    pub fn with_backend(config: AssistantConfig, backend: impl ChatBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            config,
            facts: FactStore::default(),
        }
    }

    /// Replace the fact table.
    pub fn with_facts(mut self, facts: FactStore) -> Self {
        self.facts = facts;
        self
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    /// Run one turn.
    ///
    /// Blank input is ignored and returns `Ok(None)`. Without a credential the
    /// turn is aborted before the transcript is touched. Otherwise the user
    /// message is appended, the reply is streamed through `on_fragment` as it
    /// arrives, and the concatenated reply is appended once the stream ends.
    /// Failures are returned as-is: nothing is retried and a partial reply is
    /// discarded.
    pub async fn respond<F>(
        &self,
        input: &str,
        transcript: &mut Transcript,
        credential: Option<&Credential>,
        mut on_fragment: F,
    ) -> Result<Option<Reply>, AssistantError>
    where
        F: FnMut(&str),
    {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let Some(credential) = credential else {
            warn!("turn aborted: no API key configured");
            return Err(AssistantError::MissingCredential);
        };

        transcript.push_user(input);

        let facts = self.facts.search(input);
        let fact_hits = facts.len();
        let context = prompt::context_block(&facts);
        debug!(fact_hits, "assembled tax context");

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: prompt::build_payload(prompt::system_instruction(&context), transcript),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut stream = self
            .backend
            .stream_chat(credential, request)
            .await
            .map_err(log_failure)?;

        let mut text = String::new();
        let mut fragments = 0usize;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment.map_err(log_failure)?;
            on_fragment(&fragment);
            text.push_str(&fragment);
            fragments += 1;
        }

        transcript.push_assistant(text.clone());
        info!(fact_hits, fragments, chars = text.len(), "turn completed");

        Ok(Some(Reply { text, fact_hits }))
    }
}

fn log_failure(error: BackendError) -> BackendError {
    warn!(%error, "completion failed");
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.base_url.is_none());
        assert!(config.temperature.is_none());
        assert!(config.max_tokens.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = AssistantConfig::new()
            .with_model("gpt-4o-mini")
            .with_base_url("http://localhost:8080/v1")
            .with_temperature(5.0)
            .with_max_tokens(512)
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, Some(2.0));
        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(
            config.openai_backend().base_url(),
            "http://localhost:8080/v1"
        );
    }

    #[test]
    fn test_missing_credential_message() {
        assert_eq!(
            AssistantError::MissingCredential.to_string(),
            "No API key configured - add your OpenAI API key to continue"
        );
    }
}
