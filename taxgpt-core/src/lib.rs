//! Canadian tax assistant.
//!
//! This crate provides:
//! - A keyword-indexed table of Canadian tax facts
//! - A static feed of CRA advisories
//! - A chat assistant that augments each question with matching facts and
//!   streams the answer from an OpenAI-compatible model
//!
//! # Quick Start
//!
//! ```ignore
//! use taxgpt_core::{AssistantConfig, ChatSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = ChatSession::new(AssistantConfig::default())
//!         .with_credential(std::env::var("OPENAI_API_KEY")?);
//!
//!     session
//!         .ask("What is the TFSA limit for 2024?", |fragment| print!("{fragment}"))
//!         .await?;
//!
//!     println!();
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod credential;
pub mod facts;
pub mod notices;
pub mod session;
pub mod testing;
pub mod transcript;

// Primary public API
pub use assistant::{AssistantConfig, AssistantError, Reply, TaxAssistant};
pub use credential::Credential;
pub use facts::{FactEntry, FactStore};
pub use notices::NoticeFeed;
pub use session::ChatSession;
pub use testing::{ScriptedBackend, ScriptedReply};
pub use transcript::{Message, Role, Transcript};
