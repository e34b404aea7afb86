//! Interactive line commands.

use crate::models::Rating;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// A question for the backend
    Ask(String),
    /// Rate the last answer
    Feedback { rating: Rating, text: Option<String> },
    /// List documents
    Docs,
    Help,
    Quit,
    /// Blank line
    Empty,
    /// A `/command` that does not exist
    Unknown(String),
}

/// Parse a line read from the prompt.
pub fn parse_repl_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if !line.starts_with('/') {
        return ReplCommand::Ask(line.to_string());
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let text = (!rest.is_empty()).then(|| rest.to_string());

    match command {
        "/good" => ReplCommand::Feedback {
            rating: Rating::Positive,
            text,
        },
        "/bad" => ReplCommand::Feedback {
            rating: Rating::Negative,
            text,
        },
        "/docs" => ReplCommand::Docs,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}
