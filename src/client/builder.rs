//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use gui_bridge::Client;
//!
//! # fn example() -> gui_bridge::Result<()> {
//! let client = Client::builder()
//!     .socket_path("/tmp/openflow-mcp.sock")
//!     .command_timeout(Duration::from_secs(20))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

use super::core::Client;
use super::options::ClientOptions;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    options: ClientOptions,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing options.
    #[inline]
    #[must_use]
    pub fn from_options(options: ClientOptions) -> Self {
        Self { options }
    }

    /// Sets the Unix socket path.
    #[inline]
    #[must_use]
    pub fn socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.socket_path = path.into();
        self
    }

    /// Sets the default command timeout.
    #[inline]
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.options.command_timeout = timeout;
        self
    }

    /// Sets the default script timeout.
    #[inline]
    #[must_use]
    pub fn script_timeout(mut self, timeout: Duration) -> Self {
        self.options.script_timeout = timeout;
        self
    }

    /// Sets the pending-request cap.
    #[inline]
    #[must_use]
    pub fn max_pending_requests(mut self, max: usize) -> Self {
        self.options.max_pending_requests = max;
        self
    }

    /// Builds the client with validation. Does not connect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the socket path is empty, a timeout is
    /// zero, or the pending-request cap is zero.
    pub fn build(self) -> Result<Client> {
        self.validate()?;
        Ok(Client::new(self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    fn validate(&self) -> Result<()> {
        let options = &self.options;

        if options.socket_path.as_os_str().is_empty() {
            return Err(Error::config(
                "Socket path is required. Use .socket_path() to set it.",
            ));
        }

        if options.command_timeout.is_zero() {
            return Err(Error::config("Command timeout must be greater than zero"));
        }

        if options.script_timeout.is_zero() {
            return Err(Error::config("Script timeout must be greater than zero"));
        }

        if options.max_pending_requests == 0 {
            return Err(Error::config(
                "Pending request limit must be greater than zero",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
