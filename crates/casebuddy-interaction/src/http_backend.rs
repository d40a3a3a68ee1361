//! HttpChatBackend - the `POST /chat` exchange over reqwest.

use async_trait::async_trait;
use casebuddy_core::config::ClientConfig;
use casebuddy_core::error::{CaseBuddyError, Result};
use casebuddy_core::exchange::{ChatBackend, ChatRequest, ChatResponse};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Chat backend reached over HTTP.
#[derive(Clone)]
pub struct HttpChatBackend {
    client: Client,
    endpoint: String,
}

impl HttpChatBackend {
    /// Creates a backend posting to `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CaseBuddyError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.chat_endpoint(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::info!(
            "POST {} (case: {:?}, wants_stats: {})",
            self.endpoint,
            request.case_id,
            request.wants_stats
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        let decoded = decode_chat_response(status, &body);
        match &decoded {
            Ok(resp) => tracing::info!(
                "Exchange finished: {} ({} card(s))",
                status,
                resp.ui_cards.len()
            ),
            Err(err) => tracing::warn!("Exchange failed: {}", err),
        }
        decoded
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
}

/// Decodes a `/chat` response body.
///
/// A non-success status and a body carrying a non-null `error` field are
/// both failures. The message is the `error` text when present, otherwise
/// `Request failed (<status>)`.
pub fn decode_chat_response(status: StatusCode, body: &str) -> Result<ChatResponse> {
    let error_text = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|wrapper| wrapper.error)
        .and_then(|value| match value {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        });

    if let Some(message) = error_text {
        return Err(CaseBuddyError::backend(Some(status.as_u16()), message));
    }

    if !status.is_success() {
        return Err(CaseBuddyError::backend(
            Some(status.as_u16()),
            format!("Request failed ({})", status.as_u16()),
        ));
    }

    serde_json::from_str::<ChatResponse>(body).map_err(|err| {
        CaseBuddyError::backend(
            Some(status.as_u16()),
            format!("Failed to parse chat response: {err}"),
        )
    })
}

fn map_transport_error(err: reqwest::Error) -> CaseBuddyError {
    let message = if err.is_timeout() {
        format!("Request timed out: {err}")
    } else if err.is_connect() {
        format!("Could not reach the backend: {err}")
    } else {
        format!("Request failed: {err}")
    };
    CaseBuddyError::backend(err.status().map(|s| s.as_u16()), message)
}
