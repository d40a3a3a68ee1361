//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: transcript entries (`MessageRole`, `ChatMessage`)
//! - `transcript`: the ordered message list with upsert-by-id (`Transcript`)
//! - `model`: persisted identity slots (`ClientState`)
//! - `repository`: persistence trait for those slots (`ClientStateRepository`)

mod message;
mod model;
mod repository;
mod transcript;

pub use message::{ChatMessage, MessageRole, new_message_id};
pub use model::ClientState;
pub use repository::ClientStateRepository;
pub use transcript::{Transcript, Upsert};
