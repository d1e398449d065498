//! Client configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use gui_bridge::ClientOptions;
//!
//! let options = ClientOptions::new()
//!     .with_socket_path("/tmp/other.sock")
//!     .with_command_timeout(Duration::from_secs(30));
//!
//! assert_eq!(options.max_pending_requests, 100);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::transport::manager::DEFAULT_MAX_PENDING;

// ============================================================================
// Constants
// ============================================================================

/// Socket path the GUI peer binds by default.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/openflow-mcp.sock";

/// Environment variable overriding the socket path.
pub const SOCKET_PATH_ENV: &str = "GUI_BRIDGE_SOCKET";

/// Default timeout for ordinary commands.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for script execution.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// ClientOptions
// ============================================================================

/// Settings for a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Unix socket the peer listens on.
    pub socket_path: PathBuf,

    /// Timeout applied when a command is sent without an explicit one.
    pub command_timeout: Duration,

    /// Timeout for `EXECUTE_JS` when the caller does not set one.
    pub script_timeout: Duration,

    /// Maximum simultaneously pending requests.
    pub max_pending_requests: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            max_pending_requests: DEFAULT_MAX_PENDING,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates default options, taking the socket path from
    /// `GUI_BRIDGE_SOCKET` when it is set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(path) = env::var_os(SOCKET_PATH_ENV).filter(|p| !p.is_empty()) {
            options.socket_path = PathBuf::from(path);
        }
        options
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Sets the socket path.
    #[inline]
    #[must_use]
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Sets the default command timeout.
    #[inline]
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the default script timeout.
    #[inline]
    #[must_use]
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Sets the pending-request cap.
    #[inline]
    #[must_use]
    pub fn with_max_pending_requests(mut self, max: usize) -> Self {
        self.max_pending_requests = max;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
