//! Terminal rendering for the chat.

use taxgpt_core::{Role, Transcript};

pub const PROMPT: &str = "How can I help with your taxes?";
pub const KEY_MISSING: &str = "🗝️  Please add your OpenAI API key to continue.";

/// Title, caption and the CRA update list.
pub fn print_banner(notices: &[String]) {
    println!("🍁 TaxGPT");
    println!("Canadian Tax Assistant");
    println!();
    print_notices(notices);
    println!();
    println!("Accounting Assistant");
    println!("Ask me about **TFSA limits**, **RRSP deadlines**, or **Home Office expenses**.");
    println!("Type /help for commands.");
    println!();
}

pub fn print_notices(notices: &[String]) {
    println!("📢 Live CRA Updates");
    for notice in notices {
        println!("  {notice}");
    }
}

pub fn print_history(transcript: &Transcript) {
    if transcript.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for message in transcript {
        println!("{}", format_message_header(message.role));
        println!("{}", message.content);
        println!();
    }
}

pub fn print_help() {
    println!("Commands:");
    println!("  /key <value>  - Set your OpenAI API key for this session");
    println!("  /key          - Forget the API key");
    println!("  /notices      - Show the live CRA updates");
    println!("  /history      - Show the conversation so far");
    println!("  /help         - Show this help");
    println!("  /quit         - Exit");
    println!();
    println!("Anything else is sent to the assistant.");
}

pub fn format_message_header(role: Role) -> &'static str {
    match role {
        Role::User => "[you]",
        Role::Assistant => "[assistant]",
        Role::System => "[system]",
    }
}
