//! Local-only commands.
//!
//! These are intercepted before any remote exchange. They change
//! presentation state only and are never sent to the backend.

use serde::Serialize;
use std::sync::OnceLock;

/// Presentation change applied by a local command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationEffect {
    EnablePinkMode,
}

/// A reserved literal command.
#[derive(Debug, Clone, Serialize)]
pub struct LocalCommand {
    /// Normalized (trimmed, lower-case) text that triggers the command.
    pub literal: &'static str,
    /// Fixed assistant reply appended after the echoed user text.
    pub acknowledgement: &'static str,
    pub effect: PresentationEffect,
}

impl LocalCommand {
    pub const fn new(
        literal: &'static str,
        acknowledgement: &'static str,
        effect: PresentationEffect,
    ) -> Self {
        Self {
            literal,
            acknowledgement,
            effect,
        }
    }
}

static LOCAL_COMMANDS: OnceLock<Vec<LocalCommand>> = OnceLock::new();

/// Returns all local commands.
pub fn local_commands() -> &'static [LocalCommand] {
    LOCAL_COMMANDS.get_or_init(|| {
        vec![LocalCommand::new(
            "pink mode",
            "💖",
            PresentationEffect::EnablePinkMode,
        )]
    })
}

/// Matches already-trimmed input against the reserved literals,
/// case-insensitively.
pub fn match_local_command(text: &str) -> Option<&'static LocalCommand> {
    let normalized = text.trim().to_lowercase();
    local_commands().iter().find(|cmd| cmd.literal == normalized)
}
