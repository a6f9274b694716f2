//! Error types for the portfolio advisor
//!
//! The response engine itself is total and never fails. Errors only exist
//! at the session, storage, config and transport seams.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Session Errors
    // =============================

    #[error("A reply is still pending for this session")]
    TurnInFlight,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session has been closed")]
    SessionClosed,

    #[error("Session limit reached ({0} open sessions)")]
    TooManySessions(usize),

    // =============================
    // Access Errors
    // =============================

    #[error("User name is empty")]
    EmptyUserName,

    // =============================
    // Infrastructure Errors
    // =============================

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("UUID parse error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
