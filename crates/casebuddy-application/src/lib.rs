//! Application layer for CaseBuddy.
//!
//! Coordinates the domain types in `casebuddy-core` with a chat backend and
//! a client state repository supplied by the outer layers.

pub mod engine;
pub mod navigator_registry;
pub mod render;

pub use engine::{ConversationEngine, ConversationSnapshot, Rejection, TurnOutcome};
pub use navigator_registry::{CardKey, NavigatorRegistry};
pub use render::{TranscriptEntry, render_transcript};
