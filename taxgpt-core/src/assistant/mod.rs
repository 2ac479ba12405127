//! Tax assistant module.
//!
//! Contains the assistant agent, prompt assembly and the completion
//! backend seam.

mod agent;
pub mod backend;
pub mod prompt;

pub use agent::{AssistantConfig, AssistantError, Reply, TaxAssistant};
pub use backend::{BackendError, ChatBackend, ChatRequest, FragmentStream, OpenAiBackend};
pub use prompt::NO_CONTEXT_PLACEHOLDER;
