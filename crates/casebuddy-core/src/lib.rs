//! Domain layer for the CaseBuddy client.
//!
//! Everything here is pure: message and transcript types, card
//! normalization, geometry, the simulator navigator, and the traits the
//! outer layers implement (`ChatBackend`, `ClientStateRepository`).

pub mod card;
pub mod command;
pub mod config;
pub mod error;
pub mod exchange;
pub mod geometry;
pub mod intent;
pub mod navigator;
pub mod session;

// Re-export common error type
pub use error::CaseBuddyError;
