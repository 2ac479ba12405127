//! The interactive chat loop.
//!
//! Lines starting with `/` are commands; anything else is a question for the
//! assistant. One question is answered at a time: the next line is not read
//! until the current reply has finished streaming.

use crate::render;
use std::io::{self, Write};
use taxgpt_core::{AssistantError, ChatSession, Role};
use tokio::io::{AsyncBufReadExt, BufReader};

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    SetKey(String),
    ClearKey,
    Notices,
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        "notices" => Command::Notices,
        "history" => Command::History,
        "key" if arg.is_empty() => Command::ClearKey,
        "key" => Command::SetKey(arg.to_string()),
        other => Command::Unknown(other.to_string()),
    }
}

/// Run the chat until EOF or `/quit`.
pub async fn run(mut session: ChatSession) -> anyhow::Result<()> {
    render::print_banner(session.notices());
    if !session.has_credential() {
        println!("{}", render::KEY_MISSING);
        println!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} > ", render::PROMPT);
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_command(&line) {
            Command::Empty => continue,
            Command::Quit => {
                println!("Goodbye!");
                break;
            }
            Command::Help => render::print_help(),
            Command::Notices => render::print_notices(session.notices()),
            Command::History => render::print_history(session.transcript()),
            Command::SetKey(key) => {
                if session.set_credential(key) {
                    println!("[KEY] API key set for this session.");
                } else {
                    println!("{}", render::KEY_MISSING);
                }
            }
            Command::ClearKey => {
                session.clear_credential();
                println!("[KEY] API key cleared.");
            }
            Command::Unknown(name) => {
                println!("[ERROR] Unknown command: /{name}. Type /help for commands.");
            }
            Command::Ask(question) => ask(&mut session, &question).await?,
        }
    }

    Ok(())
}

async fn ask(session: &mut ChatSession, question: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    answer(session, question, &mut stdout).await
}

/// Stream one answer to `out`. The assistant header appears only once a
/// fragment arrives.
async fn answer<W: Write>(
    session: &mut ChatSession,
    question: &str,
    out: &mut W,
) -> io::Result<()> {
    let mut started = false;
    let result = session
        .ask(question, |fragment| {
            if !started {
                let _ = writeln!(out, "{}", render::format_message_header(Role::Assistant));
                started = true;
            }
            let _ = write!(out, "{fragment}");
            let _ = out.flush();
        })
        .await;

    match result {
        Ok(_) => writeln!(out, "\n")?,
        Err(AssistantError::MissingCredential) => writeln!(out, "{}\n", render::KEY_MISSING)?,
        Err(e) if started => writeln!(out, "\n[ERROR] {e}\n")?,
        Err(e) => writeln!(out, "[ERROR] {e}\n")?,
    }
    out.flush()
}
