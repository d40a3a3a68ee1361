//! Remote exchange contract with the chat backend.

use crate::card::Card;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    /// Set only when binding a case; follow-ups rely on the session.
    pub case_id: Option<String>,
    pub user_message: String,
    #[serde(rename = "wantsStats", default)]
    pub wants_stats: bool,
}

/// Successful response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default, alias = "stageLabel")]
    pub stage_label: Option<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, alias = "uiCards")]
    pub ui_cards: Vec<Card>,
}

/// A single request/response exchange with the backend.
///
/// Failures (non-success status, an `error` field in the body, transport
/// errors) all surface as `CaseBuddyError::Backend`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
