//! `devbot chat` — interactive terminal chat.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use devbot::config::Config;
use devbot::history::ConversationLog;
use devbot::resolver::{AnswerResolver, Resolution};
use devbot::DevbotError;

const PROMPT: &str = "You: ";

/// Read questions until `exit`, `quit`, Ctrl-C or Ctrl-D.
pub(crate) async fn cmd_chat(config: Config) -> Result<()> {
    let resolver =
        AnswerResolver::from_config(&config).with_context(|| "Failed to set up answer resolver")?;
    let log = ConversationLog::new(config.history.capacity);
    let mut editor = DefaultEditor::new().with_context(|| "Failed to initialize line editor")?;

    println!("DevBot ready. Type 'exit' to quit.");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).with_context(|| "Failed to read input"),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            break;
        }
        let _ = editor.add_history_entry(input);
        log.record(input);

        match resolver.resolve(input).await {
            Ok(resolution) => println!("{}", format_reply(&resolution)),
            Err(DevbotError::InvalidInput(msg)) => println!("DevBot: {}", msg),
            Err(e) => return Err(e).with_context(|| "Failed to resolve question"),
        }
    }

    println!("Bye. {} question(s) this session.", log.len());
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit" | "/exit" | "/quit")
}

fn format_reply(resolution: &Resolution) -> String {
    if resolution.cached {
        format!("DevBot (cached): {}", resolution.answer)
    } else {
        format!("DevBot: {}", resolution.answer)
    }
}
