//! Error types for the bloomd client
//!
//! Provides a unified error type for all client operations.
//!
//! Domain outcomes such as "filter does not exist" or "filter already
//! exists" are NOT errors; they decode to `false` or an empty result.
//! Everything in here means the client or its transport broke.

use thiserror::Error;

/// Result type alias using BloomdError
pub type Result<T> = std::result::Result<T, BloomdError>;

/// Unified error type for bloomd client operations
#[derive(Debug, Error)]
pub enum BloomdError {
    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl BloomdError {
    /// Whether the connection's framing state can no longer be trusted.
    ///
    /// After one of these the only safe recovery is to drop the connection
    /// and dial again.
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            BloomdError::Connection(_) | BloomdError::Io(_) | BloomdError::Protocol(_)
        )
    }
}
