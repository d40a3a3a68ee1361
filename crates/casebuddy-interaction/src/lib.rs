//! Remote collaborators for the CaseBuddy client.

pub mod http_backend;

pub use http_backend::{HttpChatBackend, decode_chat_response};
