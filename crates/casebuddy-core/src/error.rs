//! Error types for the CaseBuddy client.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire CaseBuddy client.
///
/// Precondition violations (empty input, a request already in flight, no
/// active case) are not represented here. Those are rejected at the
/// operation boundary as no-ops.
#[derive(Error, Debug, Clone, Serialize)]
pub enum CaseBuddyError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote exchange failed, either at the transport level or with an
    /// `error` field in the response body.
    #[error("Backend error: {message}")]
    Backend {
        status: Option<u16>,
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CaseBuddyError {
    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Backend error
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Backend error
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Human-readable text shown in the transcript and the inline banner.
    ///
    /// Backend errors surface their message verbatim; everything else uses
    /// the `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for CaseBuddyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CaseBuddyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CaseBuddyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CaseBuddyError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CaseBuddyError>`.
pub type Result<T> = std::result::Result<T, CaseBuddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_user_message_is_verbatim() {
        let err = CaseBuddyError::backend(Some(404), "Case not found");
        assert!(err.is_backend());
        assert_eq!(err.user_message(), "Case not found");
        assert_eq!(err.to_string(), "Backend error: Case not found");
    }

    #[test]
    fn test_non_backend_user_message_uses_display() {
        let err = CaseBuddyError::config("missing backend_url");
        assert_eq!(
            err.user_message(),
            "Configuration error: missing backend_url"
        );
    }

    #[test]
    fn test_from_json_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: CaseBuddyError = parse.unwrap_err().into();
        assert!(matches!(err, CaseBuddyError::Serialization { ref format, .. } if format == "JSON"));
    }
}
