use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

const COMMANDS: &[&str] = &["/sim", "/back", "/quit"];

/// What a submitted line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    /// Activate choice `n` (1-based) of the latest simulator card.
    Simulate(usize),
    Back,
    Unknown(String),
    /// Plain text: a case id before binding, a message after.
    Input(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if matches!(trimmed, "quit" | "exit") {
            return Self::Quit;
        }
        if !trimmed.starts_with('/') {
            return Self::Input(trimmed.to_string());
        }

        let mut parts = trimmed.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("/quit"), _) => Self::Quit,
            (Some("/back"), _) => Self::Back,
            (Some("/sim"), Some(arg)) => match arg.parse::<usize>() {
                Ok(n) if n > 0 => Self::Simulate(n),
                _ => Self::Unknown(trimmed.to_string()),
            },
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// rustyline helper: slash-command completion, hints and highlighting.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("/quit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse(" exit "), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/back"), ReplCommand::Back);
        assert_eq!(ReplCommand::parse("/sim 2"), ReplCommand::Simulate(2));
    }

    #[test]
    fn test_bad_sim_argument_is_unknown() {
        assert!(matches!(ReplCommand::parse("/sim 0"), ReplCommand::Unknown(_)));
        assert!(matches!(ReplCommand::parse("/sim two"), ReplCommand::Unknown(_)));
        assert!(matches!(ReplCommand::parse("/sim"), ReplCommand::Unknown(_)));
    }

    #[test]
    fn test_plain_text_is_input() {
        assert_eq!(
            ReplCommand::parse("  Pink Mode "),
            ReplCommand::Input("Pink Mode".to_string())
        );
    }
}
