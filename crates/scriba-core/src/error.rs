//! Error types for the scriba engine.

use crate::backend::Provider;
use thiserror::Error;

/// A shared error type for the scriba engine.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Only session-fatal
/// conditions live here; chunk-local completion failures are handled inside
/// the flush cycle and never surface through this type.
#[derive(Error, Debug, Clone)]
pub enum ScribaError {
    /// No API key resolvable for the requested provider, neither from the
    /// explicit argument nor from the credential store.
    #[error("No API key found for provider '{provider}'")]
    MissingCredential { provider: Provider },

    /// The caller-supplied provider identifier is not one we know.
    #[error("Unsupported model provider: {0}")]
    UnsupportedProvider(String),

    /// A summarization session for this meeting is already in progress.
    #[error("Summarization session already in progress for meeting '{0}'")]
    SessionExists(String),

    /// No active summarization session for this meeting.
    #[error("No active summarization session for meeting '{0}'")]
    NoSession(String),

    /// The operation was cancelled, typically during process shutdown.
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScribaError {
    /// Creates a MissingCredential error
    pub fn missing_credential(provider: Provider) -> Self {
        Self::MissingCredential { provider }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a MissingCredential error
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingCredential { .. })
    }

    /// Check if this is a NoSession error
    pub fn is_no_session(&self) -> bool {
        matches!(self, Self::NoSession(_))
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for ScribaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ScribaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at crate seams that bubble up
/// collaborator failures).
impl From<anyhow::Error> for ScribaError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, ScribaError>`.
pub type Result<T> = std::result::Result<T, ScribaError>;
