//! Testing utilities.
//!
//! `ScriptedBackend` stands in for the completion provider so turns can be
//! exercised deterministically without network calls. It records every
//! request it receives for later inspection.

use crate::assistant::{BackendError, ChatBackend, ChatRequest, FragmentStream};
use crate::credential::Credential;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// A scripted reply from the mock backend.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Stream these fragments, then end normally.
    Fragments(Vec<String>),
    /// Stream these fragments, then fail mid-stream.
    FailAfter(Vec<String>, String),
    /// Refuse the call before any fragment is produced.
    Reject(String),
}

impl ScriptedReply {
    /// A reply streamed as the given fragments.
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fragments(fragments.into_iter().map(Into::into).collect())
    }

    /// A reply streamed as a single fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Fragments(vec![text.into()])
    }
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The credential, exactly as it was passed in.
    pub credential: String,
    pub request: ChatRequest,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<ScriptedReply>,
    requests: Vec<RecordedRequest>,
}

/// A backend that returns scripted replies in order.
///
/// Clones share the same script, so keep one clone to inspect requests after
/// handing the other to a session.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                replies: replies.into_iter().collect(),
                requests: Vec::new(),
            })),
        }
    }

    /// Add a reply to the end of the queue.
    pub fn queue(&self, reply: ScriptedReply) {
        self.lock().replies.push_back(reply);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn stream_chat(
        &self,
        credential: &Credential,
        request: ChatRequest,
    ) -> Result<FragmentStream, BackendError> {
        let reply = {
            let mut script = self.lock();
            script.requests.push(RecordedRequest {
                credential: credential.expose().to_string(),
                request,
            });
            script.replies.pop_front()
        };

        let items: Vec<Result<String, BackendError>> = match reply {
            Some(ScriptedReply::Fragments(fragments)) => fragments.into_iter().map(Ok).collect(),
            Some(ScriptedReply::FailAfter(fragments, message)) => fragments
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(BackendError::Stream(message))))
                .collect(),
            Some(ScriptedReply::Reject(message)) => {
                return Err(BackendError::Unavailable(message));
            }
            None => vec![Ok("The assistant has no more scripted replies.".to_string())],
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }
}
