//! Persisted client identity.

use serde::{Deserialize, Serialize};

/// The two slots that survive a restart.
///
/// `session_id` is server-issued and restored on startup. `active_case_id`
/// is written whenever a case is bound but is cleared on every fresh start,
/// so a restarted client resumes the session without a case context.
///
/// # File Location
///
/// - Linux: `~/.config/casebuddy/client_state.toml`
/// - macOS: `~/Library/Application Support/casebuddy/client_state.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_case_id: Option<String>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state as seen by a freshly started client.
    pub fn for_fresh_start(self) -> Self {
        Self {
            session_id: self.session_id,
            active_case_id: None,
        }
    }
}
