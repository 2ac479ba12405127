//! ChatSession - the primary public API for a tax conversation.
//!
//! A session owns everything that lives for one conversation: the
//! assistant, the CRA notice feed, the transcript and the user's API key.
//! Create one per conversation and drop it when the conversation ends.

use crate::assistant::{AssistantConfig, AssistantError, ChatBackend, Reply, TaxAssistant};
use crate::credential::Credential;
use crate::facts::FactStore;
use crate::notices::NoticeFeed;
use crate::transcript::Transcript;

/// A single tax conversation.
///
/// `ask` takes `&mut self`, so a second turn cannot start while one is in
/// flight.
pub struct ChatSession {
    assistant: TaxAssistant,
    notices: NoticeFeed,
    transcript: Transcript,
    credential: Option<Credential>,
}

impl ChatSession {
    /// Create a session talking to OpenAI. No credential is set yet.
    pub fn new(config: AssistantConfig) -> Self {
        Self::from_assistant(TaxAssistant::new(config))
    }

    /// Create a session with a custom completion backend.
    pub fn with_backend(config: AssistantConfig, backend: impl ChatBackend + 'static) -> Self {
        Self::from_assistant(TaxAssistant::with_backend(config, backend))
    }

    /// Wrap a pre-configured assistant.
    pub fn from_assistant(assistant: TaxAssistant) -> Self {
        Self {
            assistant,
            notices: NoticeFeed::default(),
            transcript: Transcript::new(),
            credential: None,
        }
    }

    /// Set the credential while building the session.
    pub fn with_credential(mut self, secret: impl Into<String>) -> Self {
        self.set_credential(secret);
        self
    }

    /// Replace the notice feed.
    pub fn with_notices(mut self, notices: NoticeFeed) -> Self {
        self.notices = notices;
        self
    }

    /// Set the API key. Returns false (and clears any previous key) when the
    /// secret is blank.
    pub fn set_credential(&mut self, secret: impl Into<String>) -> bool {
        self.credential = Credential::new(secret);
        self.credential.is_some()
    }

    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Ask the assistant a question.
    ///
    /// `on_fragment` sees each piece of the reply as it streams in. Returns
    /// `Ok(None)` for blank input.
    pub async fn ask<F>(&mut self, input: &str, on_fragment: F) -> Result<Option<Reply>, AssistantError>
    where
        F: FnMut(&str),
    {
        self.assistant
            .respond(
                input,
                &mut self.transcript,
                self.credential.as_ref(),
                on_fragment,
            )
            .await
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The CRA notices for display beside the conversation.
    pub fn notices(&self) -> &[String] {
        self.notices.notices()
    }

    pub fn facts(&self) -> &FactStore {
        self.assistant.facts()
    }

    pub fn config(&self) -> &AssistantConfig {
        self.assistant.config()
    }
}
