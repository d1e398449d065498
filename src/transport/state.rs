//! Connection state machine types.
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──ok──► Connected
//!       ▲                          │                 │
//!       │                          └──fail/timeout──►Error
//!       └──────── disconnect() / peer close ─────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::result::Result as StdResult;
use std::time::SystemTime;

use tokio::sync::oneshot;

use crate::error::ConnectFailure;

use super::Connection;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of a client's connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket.
    #[default]
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Socket open and event loop running.
    Connected,
    /// The last attempt failed or the socket errored.
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ConnectionStatus
// ============================================================================

/// Read-only snapshot of a client's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Current state.
    pub state: ConnectionState,
    /// Socket the client targets.
    pub socket_path: PathBuf,
    /// Message of the most recent failure, if any.
    pub last_error: Option<String>,
    /// When the most recent connection was established.
    pub connected_at: Option<SystemTime>,
}

impl ConnectionStatus {
    /// Returns `true` if the snapshot was taken while connected.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

// ============================================================================
// LinkState
// ============================================================================

/// Waiter for the outcome of an in-flight connection attempt.
pub(crate) type ConnectWaiter = oneshot::Sender<StdResult<Connection, ConnectFailure>>;

/// Mutable connection state shared by the manager and the event loop.
///
/// Guarded by one mutex; never held across an `.await`.
#[derive(Default)]
pub(crate) struct LinkState {
    /// Current state.
    pub state: ConnectionState,
    /// Live connection handle when connected.
    pub connection: Option<Connection>,
    /// Callers awaiting the in-flight attempt.
    pub waiters: Vec<ConnectWaiter>,
    /// Most recent failure.
    pub last_error: Option<String>,
    /// Most recent successful connect.
    pub connected_at: Option<SystemTime>,
    /// Bumped on every attempt and every disconnect.
    ///
    /// Attempts and close notifications from an older generation are ignored.
    pub generation: u64,
}

impl LinkState {
    /// Builds a status snapshot.
    pub fn snapshot(&self, socket_path: PathBuf) -> ConnectionStatus {
        ConnectionStatus {
            state: self.state,
            socket_path,
            last_error: self.last_error.clone(),
            connected_at: self.connected_at,
        }
    }

    /// Returns the live connection, if the state says connected and the
    /// event loop is still running.
    pub fn live_connection(&self) -> Option<&Connection> {
        if self.state != ConnectionState::Connected {
            return None;
        }
        self.connection.as_ref().filter(|c| !c.is_closed())
    }
}

// ============================================================================
// Tests
// ============================================================================
