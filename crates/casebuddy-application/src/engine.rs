//! The session/conversation engine.
//!
//! Owns the transcript and session identity, runs at most one remote
//! exchange at a time, and publishes a snapshot after every transition.

use casebuddy_core::card::Card;
use casebuddy_core::command::{PresentationEffect, match_local_command};
use casebuddy_core::error::CaseBuddyError;
use casebuddy_core::exchange::{ChatBackend, ChatRequest, ChatResponse};
use casebuddy_core::intent::wants_stats;
use casebuddy_core::session::{
    ChatMessage, ClientStateRepository, MessageRole, Transcript, new_message_id,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

pub const ANALYZING_TEXT: &str = "Analyzing similar cases…";
pub const THINKING_TEXT: &str = "Thinking…";

fn case_echo(case_id: &str) -> String {
    format!("Case ID: {}", case_id)
}

fn case_prompt(case_id: &str) -> String {
    format!(
        "Explain case {}. Give me a clear stage + plain-language summary.",
        case_id
    )
}

/// Everything an observer needs to draw the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationSnapshot {
    pub session_id: Option<String>,
    pub active_case_id: Option<String>,
    pub transcript: Transcript,
    pub draft: String,
    pub case_input: String,
    pub loading: bool,
    /// Id of the stats placeholder while one is pending.
    pub analyzing_id: Option<String>,
    /// Inline banner text from the last failed exchange.
    pub last_error: Option<String>,
    pub stage_label: Option<String>,
    pub pink_mode: bool,
}

impl ConversationSnapshot {
    pub fn is_analyzing(&self) -> bool {
        self.analyzing_id.is_some()
    }

    /// The generic indicator is hidden while a stats placeholder is visible.
    pub fn show_thinking(&self) -> bool {
        self.loading && !self.is_analyzing()
    }
}

/// Why an operation was refused at its boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    NoActiveCase,
    Busy,
}

#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// A local command ran; nothing was sent.
    Local(PresentationEffect),
    /// The exchange succeeded; `message_id` holds the assistant reply.
    Completed { message_id: String },
    /// The exchange failed; `message_id` holds the error text.
    Failed {
        message_id: String,
        error: CaseBuddyError,
    },
    Rejected(Rejection),
}

impl TurnOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Identity changes to write through after a transition.
#[derive(Debug, Default)]
struct PendingWrites {
    session_id: Option<String>,
    active_case_id: Option<String>,
}

pub struct ConversationEngine {
    backend: Arc<dyn ChatBackend>,
    repository: Arc<dyn ClientStateRepository>,
    state: Mutex<ConversationSnapshot>,
    updates: watch::Sender<ConversationSnapshot>,
}

impl ConversationEngine {
    /// Builds an engine from persisted client state.
    ///
    /// The session id is restored. The active case never is: the slot is
    /// cleared so the user binds a case again.
    pub async fn start(
        backend: Arc<dyn ChatBackend>,
        repository: Arc<dyn ClientStateRepository>,
    ) -> Self {
        let restored = match repository.load().await {
            Ok(state) => state.for_fresh_start(),
            Err(e) => {
                warn!("Failed to load client state, starting fresh: {}", e);
                Default::default()
            }
        };
        if let Err(e) = repository.clear_active_case_id().await {
            warn!("Failed to clear persisted case: {}", e);
        }
        info!("Conversation started (session: {:?})", restored.session_id);

        let initial = ConversationSnapshot {
            session_id: restored.session_id,
            ..Default::default()
        };
        let (updates, _) = watch::channel(initial.clone());

        Self {
            backend,
            repository,
            state: Mutex::new(initial),
            updates,
        }
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        self.state.lock().await.clone()
    }

    /// Receives a snapshot after every completed transition.
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.updates.subscribe()
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.draft = text.into();
        self.publish(&state);
    }

    pub async fn set_case_input(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.case_input = text.into();
        self.publish(&state);
    }

    /// Sends the current draft.
    pub async fn submit_draft(&self) -> TurnOutcome {
        let draft = self.state.lock().await.draft.clone();
        self.send_message(&draft).await
    }

    /// Binds the case typed into the case input.
    pub async fn submit_case_input(&self) -> TurnOutcome {
        let case_id = self.state.lock().await.case_input.clone();
        self.bind_case(&case_id).await
    }

    /// Binds the session to a case.
    ///
    /// The active case is set only once the backend accepts the binding.
    pub async fn bind_case(&self, case_id: &str) -> TurnOutcome {
        let case_id = case_id.trim().to_string();
        if case_id.is_empty() {
            return TurnOutcome::Rejected(Rejection::EmptyInput);
        }

        let session_id = {
            let mut state = self.state.lock().await;
            if state.loading {
                return TurnOutcome::Rejected(Rejection::Busy);
            }
            state.loading = true;
            state.last_error = None;
            state.transcript.push(ChatMessage::user(case_echo(&case_id)));
            self.publish(&state);
            state.session_id.clone()
        };

        info!("Binding case {}", case_id);
        let request = ChatRequest {
            session_id,
            case_id: Some(case_id.clone()),
            user_message: case_prompt(&case_id),
            wants_stats: false,
        };
        let result = self.backend.exchange(&request).await;

        let mut state = self.state.lock().await;
        let mut writes = PendingWrites::default();
        let outcome = match result {
            Ok(response) => {
                writes.session_id = apply_identity(&mut state, &response);
                state.active_case_id = Some(case_id.clone());
                state.case_input.clear();
                writes.active_case_id = Some(case_id);

                let message = ChatMessage::assistant(response.explanation, response.ui_cards);
                let message_id = message.id.clone();
                state.transcript.push(message);
                TurnOutcome::Completed { message_id }
            }
            Err(error) => {
                let text = error.user_message();
                warn!("Case binding failed: {}", text);
                state.last_error = Some(text.clone());
                let message = ChatMessage::assistant_error(text);
                let message_id = message.id.clone();
                state.transcript.push(message);
                TurnOutcome::Failed { message_id, error }
            }
        };
        self.persist(writes).await;
        state.loading = false;
        self.publish(&state);
        outcome
    }

    /// Sends a follow-up about the active case.
    pub async fn send_message(&self, text: &str) -> TurnOutcome {
        let text = text.trim().to_string();

        let (session_id, placeholder_id, wants) = {
            let mut state = self.state.lock().await;
            if state.active_case_id.is_none() {
                return TurnOutcome::Rejected(Rejection::NoActiveCase);
            }
            if text.is_empty() {
                return TurnOutcome::Rejected(Rejection::EmptyInput);
            }
            if state.loading {
                return TurnOutcome::Rejected(Rejection::Busy);
            }

            if let Some(command) = match_local_command(&text) {
                debug!("Local command '{}'", command.literal);
                state.transcript.push(ChatMessage::user(text));
                state.draft.clear();
                apply_effect(&mut state, command.effect);
                state.transcript.push(ChatMessage::assistant(
                    command.acknowledgement,
                    Vec::new(),
                ));
                self.publish(&state);
                return TurnOutcome::Local(command.effect);
            }

            let wants = wants_stats(&text);
            state.loading = true;
            state.last_error = None;
            state.transcript.push(ChatMessage::user(text.clone()));
            state.draft.clear();

            let placeholder_id = wants.then(|| {
                let id = new_message_id("analyzing");
                state.transcript.push(ChatMessage::new(
                    id.clone(),
                    MessageRole::Assistant,
                    ANALYZING_TEXT,
                    Vec::new(),
                ));
                id
            });
            state.analyzing_id = placeholder_id.clone();
            self.publish(&state);
            (state.session_id.clone(), placeholder_id, wants)
        };

        info!("Sending message (wants_stats: {})", wants);
        let request = ChatRequest {
            session_id,
            case_id: None,
            user_message: text,
            wants_stats: wants,
        };
        let result = self.backend.exchange(&request).await;

        let mut state = self.state.lock().await;
        let mut writes = PendingWrites::default();
        let outcome = match result {
            Ok(response) => {
                writes.session_id = apply_identity(&mut state, &response);
                let message_id = resolve(
                    &mut state.transcript,
                    placeholder_id.as_deref(),
                    response.explanation,
                    response.ui_cards,
                    ChatMessage::assistant(String::new(), Vec::new()),
                );
                TurnOutcome::Completed { message_id }
            }
            Err(error) => {
                let text = error.user_message();
                warn!("Exchange failed: {}", text);
                state.last_error = Some(text.clone());
                let message_id = resolve(
                    &mut state.transcript,
                    placeholder_id.as_deref(),
                    text,
                    Vec::new(),
                    ChatMessage::assistant_error(String::new()),
                );
                TurnOutcome::Failed { message_id, error }
            }
        };
        self.persist(writes).await;
        state.loading = false;
        state.analyzing_id = None;
        self.publish(&state);
        outcome
    }

    fn publish(&self, state: &ConversationSnapshot) {
        self.updates.send_replace(state.clone());
    }

    /// Runs under the state lock with `loading` still set, so identity
    /// writes from consecutive turns reach the repository in turn order.
    async fn persist(&self, writes: PendingWrites) {
        if let Some(session_id) = writes.session_id {
            if let Err(e) = self.repository.set_session_id(session_id).await {
                warn!("Failed to persist session id: {}", e);
            }
        }
        if let Some(case_id) = writes.active_case_id {
            if let Err(e) = self.repository.set_active_case_id(case_id).await {
                warn!("Failed to persist active case: {}", e);
            }
        }
    }
}

/// Takes the session id and stage label from a response. Returns the new
/// session id when it differs from the current one.
fn apply_identity(state: &mut ConversationSnapshot, response: &ChatResponse) -> Option<String> {
    if let Some(stage) = response.stage_label.as_deref().filter(|s| !s.is_empty()) {
        state.stage_label = Some(stage.to_string());
    }

    let incoming = response.session_id.as_deref().filter(|s| !s.is_empty())?;
    if state.session_id.as_deref() == Some(incoming) {
        return None;
    }
    debug!("Session id changed to {}", incoming);
    state.session_id = Some(incoming.to_string());
    state.session_id.clone()
}

fn apply_effect(state: &mut ConversationSnapshot, effect: PresentationEffect) {
    match effect {
        PresentationEffect::EnablePinkMode => state.pink_mode = true,
    }
}

fn resolve(
    transcript: &mut Transcript,
    placeholder_id: Option<&str>,
    content: String,
    cards: Vec<Card>,
    fallback: ChatMessage,
) -> String {
    let message_id = placeholder_id
        .map(str::to_string)
        .unwrap_or_else(|| fallback.id.clone());
    transcript.resolve(placeholder_id, content, cards, fallback);
    message_id
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
