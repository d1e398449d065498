//! Error types for the GUI bridge client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use gui_bridge::{Client, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     client.click_element("#submit", "main").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connect | [`Error::Connection`], [`Error::ConnectionTimeout`] |
//! | Write | [`Error::Write`] |
//! | Application | [`Error::Application`] |
//! | Timeout | [`Error::RequestTimeout`] |
//! | Disconnection | [`Error::Disconnected`], [`Error::ConnectionLost`] |
//! | Protocol | [`Error::Protocol`], [`Error::Decode`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Base64`], [`Error::Image`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// The display text of each variant tells the caller which category
/// occurred, so it can decide between retrying, reconnecting or aborting.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connect Errors
    // ========================================================================
    /// Socket connection failed.
    ///
    /// Returned when the transport refuses or fails the connection attempt.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection attempt exceeded the connect timeout.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Write Errors
    // ========================================================================
    /// Writing a command to the socket failed.
    ///
    /// The request was dequeued before this error was returned.
    #[error("Failed to send {command}: {message}")]
    Write {
        /// Command that could not be written.
        command: String,
        /// Underlying transport error.
        message: String,
    },

    // ========================================================================
    // Application Errors
    // ========================================================================
    /// The peer answered with `success=false`.
    ///
    /// Displays the peer message verbatim.
    #[error("{message}")]
    Application {
        /// Command the peer rejected.
        command: String,
        /// Peer-provided error, or `"<COMMAND> failed"` if none was given.
        message: String,
    },

    // ========================================================================
    // Timeout Errors
    // ========================================================================
    /// No response arrived within the request timeout.
    #[error("Command {command} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// Command that timed out.
        command: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Disconnection Errors
    // ========================================================================
    /// The client was disconnected while the request was outstanding.
    #[error("Disconnected: client closed the connection")]
    Disconnected,

    /// The peer closed the socket or the socket failed.
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// What ended the connection.
        reason: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected reply shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// A response line could not be decoded.
    ///
    /// Never surfaced as a request failure; the line is dropped.
    #[error("Decode error: {message}")]
    Decode {
        /// Parser message.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Image header decoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a write error.
    #[inline]
    pub fn write(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates an application error.
    ///
    /// Falls back to `"<COMMAND> failed"` when the peer gave no message.
    pub fn application(command: impl Into<String>, message: Option<String>) -> Self {
        let command = command.into();
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("{command} failed"));
        Self::Application { command, message }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(command: impl Into<String>, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            command: command.into(),
            timeout_ms,
        }
    }

    /// Creates a connection lost error.
    #[inline]
    pub fn connection_lost(reason: impl Into<String>) -> Self {
        Self::ConnectionLost {
            reason: reason.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error (connect or request).
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if the connection could not be established.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionTimeout { .. }
        )
    }

    /// Returns `true` if the request failed because the connection went away.
    #[inline]
    #[must_use]
    pub fn is_disconnection(&self) -> bool {
        matches!(self, Self::Disconnected | Self::ConnectionLost { .. })
    }

    /// Returns `true` if the peer rejected the command.
    #[inline]
    #[must_use]
    pub fn is_application_error(&self) -> bool {
        matches!(self, Self::Application { .. })
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry, possibly after a reconnect.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::RequestTimeout { .. }
                | Self::Write { .. }
                | Self::ConnectionLost { .. }
        )
    }
}

// ============================================================================
// ConnectFailure
// ============================================================================

/// Outcome shared by every caller awaiting the same connection attempt.
///
/// [`Error`] is not `Clone`, so waiters receive this and convert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConnectFailure {
    /// Transport error during the attempt.
    Transport(String),
    /// Attempt exceeded the connect timeout.
    Timeout(u64),
    /// `disconnect()` was called while the attempt was in flight.
    Aborted,
}

impl From<ConnectFailure> for Error {
    fn from(failure: ConnectFailure) -> Self {
        match failure {
            ConnectFailure::Transport(message) => Error::connection(message),
            ConnectFailure::Timeout(timeout_ms) => Error::connection_timeout(timeout_ms),
            ConnectFailure::Aborted => Error::Disconnected,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
