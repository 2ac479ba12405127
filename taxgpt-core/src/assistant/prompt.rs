//! Prompt assembly for a single turn.

use crate::transcript::{Message, Transcript};

/// Context used when no fact keyword matches.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No specific tax act section found.";

const CONTEXT_HEADING: &str = "CONTEXT FROM INCOME TAX ACT / CRA:";

/// Join matched fact bodies into one context block.
pub fn context_block(facts: &[&str]) -> String {
    if facts.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        facts.join("\n")
    }
}

/// The behavioral directive with the context block embedded.
pub fn system_instruction(context: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(include_str!("prompts/system.txt").trim_end());
    prompt.push_str("\n\n");
    prompt.push_str(CONTEXT_HEADING);
    prompt.push('\n');
    prompt.push_str(context);
    prompt
}

/// A fresh system message followed by every transcript message, oldest first.
pub fn build_payload(system: String, transcript: &Transcript) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(Message::system(system));
    messages.extend(transcript.iter().cloned());
    messages
}
