//! Client state repository trait.

use super::model::ClientState;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for the two client identity slots.
///
/// Implementations clear the active case slot when opened, so `load` never
/// returns a case id left over from a previous run.
#[async_trait]
pub trait ClientStateRepository: Send + Sync {
    /// Returns the current state.
    async fn load(&self) -> Result<ClientState>;

    /// Records the server-issued session id.
    async fn set_session_id(&self, session_id: String) -> Result<()>;

    /// Records the case bound to the session.
    async fn set_active_case_id(&self, case_id: String) -> Result<()>;

    /// Clears the active case slot.
    async fn clear_active_case_id(&self) -> Result<()>;
}
