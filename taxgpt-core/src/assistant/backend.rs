//! The seam between the assistant and the completion provider.

use crate::credential::Credential;
use crate::transcript::Message;
use async_trait::async_trait;
use futures::StreamExt;
use openai::{OpenAi, StreamEvent};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio_stream::Stream;

/// A lazy, finite, non-restartable sequence of reply fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, BackendError>> + Send>>;

/// Errors from a completion backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("OpenAI API error: {0}")]
    Api(#[from] openai::Error),

    #[error("Provider error mid-stream: {0}")]
    Stream(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// What gets sent for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,

    /// System instruction followed by the full transcript.
    pub messages: Vec<Message>,

    pub temperature: Option<f32>,

    pub max_tokens: Option<usize>,
}

/// A provider of streamed chat completions.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Start a streamed completion. The credential is passed through unmodified.
    async fn stream_chat(
        &self,
        credential: &Credential,
        request: ChatRequest,
    ) -> Result<FragmentStream, BackendError>;
}

/// Backend for OpenAI and OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: OpenAi,
}

impl OpenAiBackend {
    pub fn new() -> Self {
        Self {
            client: OpenAi::new(String::new()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn stream_chat(
        &self,
        credential: &Credential,
        request: ChatRequest,
    ) -> Result<FragmentStream, BackendError> {
        let client = self.client.clone().with_api_key(credential.expose());

        let mut api_request =
            openai::Request::new(request.messages.iter().map(Into::into).collect())
                .with_model(request.model);
        if let Some(temperature) = request.temperature {
            api_request = api_request.with_temperature(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            api_request = api_request.with_max_tokens(max_tokens);
        }

        let events = client.stream(api_request).await?;
        Ok(into_fragments(events))
    }
}

/// Map provider events to reply fragments.
///
/// The reply ends at `[DONE]`, or when the body closes after a finish
/// reason. A body that closes before either is an incomplete reply and
/// yields a final error.
fn into_fragments(events: openai::EventStream) -> FragmentStream {
    let fragments = events
        .map(Some)
        .chain(futures::stream::iter([None]))
        .scan(false, |finished, event| {
            let step = match event {
                Some(Ok(StreamEvent::Done)) => None,
                Some(Ok(StreamEvent::Finish { .. })) => {
                    *finished = true;
                    Some(None)
                }
                Some(Ok(StreamEvent::Delta { text })) => Some(Some(Ok(text))),
                Some(Ok(StreamEvent::Error { message })) => {
                    Some(Some(Err(BackendError::Stream(message))))
                }
                Some(Err(e)) => Some(Some(Err(BackendError::Api(e)))),
                None if *finished => None,
                None => Some(Some(Err(BackendError::Stream(
                    "stream ended before [DONE]".to_string(),
                )))),
            };
            futures::future::ready(step)
        })
        .filter_map(futures::future::ready);

    Box::pin(fragments)
}
