//! Client state repository backed by `client_state.toml`.

use crate::paths::CaseBuddyPaths;
use crate::storage::AtomicTomlFile;
use casebuddy_core::error::{CaseBuddyError, Result};
use casebuddy_core::session::{ClientState, ClientStateRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Caches the client state in memory and writes every change through to
/// disk on the blocking pool.
///
/// Opening the repository clears the active case slot, both in memory and on
/// disk, so a restarted client never inherits a case binding.
#[derive(Clone)]
pub struct TomlClientStateRepository {
    state: Arc<Mutex<ClientState>>,
    file: Arc<AtomicTomlFile<ClientState>>,
}

impl TomlClientStateRepository {
    /// Opens the state file under the resolved config directory.
    pub async fn open(paths: &CaseBuddyPaths) -> Result<Self> {
        let path = paths.state_file()?;
        Self::open_at(path).await
    }

    /// Opens the state file at an explicit path.
    pub async fn open_at(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::<ClientState>::new(path));

        let loader = file.clone();
        let state = tokio::task::spawn_blocking(move || {
            loader.update(ClientState::default(), |state| {
                state.active_case_id = None;
            })
        })
        .await
        .map_err(|e| CaseBuddyError::internal(format!("Failed to join task: {}", e)))??;

        tracing::debug!(
            "Opened client state at {} (session: {:?})",
            file.path().display(),
            state.session_id
        );

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            file,
        })
    }

    async fn save_state(&self, state: ClientState) -> Result<()> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.save(&state))
            .await
            .map_err(|e| CaseBuddyError::internal(format!("Failed to join task: {}", e)))??;
        Ok(())
    }

    async fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ClientState),
    {
        let snapshot = {
            let mut state = self.state.lock().await;
            f(&mut state);
            state.clone()
        };
        self.save_state(snapshot).await
    }
}

#[async_trait::async_trait]
impl ClientStateRepository for TomlClientStateRepository {
    async fn load(&self) -> Result<ClientState> {
        Ok(self.state.lock().await.clone())
    }

    async fn set_session_id(&self, session_id: String) -> Result<()> {
        self.modify(|state| state.session_id = Some(session_id))
            .await
    }

    async fn set_active_case_id(&self, case_id: String) -> Result<()> {
        self.modify(|state| state.active_case_id = Some(case_id))
            .await
    }

    async fn clear_active_case_id(&self) -> Result<()> {
        self.modify(|state| state.active_case_id = None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(dir: &TempDir) -> CaseBuddyPaths {
        CaseBuddyPaths::new(Some(dir.path().to_path_buf()))
    }

    #[tokio::test]
    async fn test_fresh_directory_starts_empty() {
        let dir = TempDir::new().unwrap();
        let repo = TomlClientStateRepository::open(&paths(&dir)).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), ClientState::default());
    }

    #[tokio::test]
    async fn test_session_id_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let repo = TomlClientStateRepository::open(&paths(&dir)).await.unwrap();
        repo.set_session_id("sess-42".to_string()).await.unwrap();
        drop(repo);

        let reopened = TomlClientStateRepository::open(&paths(&dir)).await.unwrap();
        let state = reopened.load().await.unwrap();
        assert_eq!(state.session_id.as_deref(), Some("sess-42"));
    }

    #[tokio::test]
    async fn test_active_case_is_cleared_on_reopen() {
        let dir = TempDir::new().unwrap();
        let repo = TomlClientStateRepository::open(&paths(&dir)).await.unwrap();
        repo.set_session_id("sess-1".to_string()).await.unwrap();
        repo.set_active_case_id("24CR0001".to_string()).await.unwrap();
        assert_eq!(
            repo.load().await.unwrap().active_case_id.as_deref(),
            Some("24CR0001")
        );
        drop(repo);

        let reopened = TomlClientStateRepository::open(&paths(&dir)).await.unwrap();
        let state = reopened.load().await.unwrap();
        assert_eq!(state.session_id.as_deref(), Some("sess-1"));
        assert!(state.active_case_id.is_none());

        let on_disk = std::fs::read_to_string(dir.path().join("client_state.toml")).unwrap();
        assert!(!on_disk.contains("24CR0001"));
    }

    #[tokio::test]
    async fn test_clear_active_case() {
        let dir = TempDir::new().unwrap();
        let repo = TomlClientStateRepository::open(&paths(&dir)).await.unwrap();
        repo.set_active_case_id("C-9".to_string()).await.unwrap();
        repo.clear_active_case_id().await.unwrap();
        assert!(repo.load().await.unwrap().active_case_id.is_none());
    }
}
