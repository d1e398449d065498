//! Connection lifecycle for one socket path.
//!
//! The manager owns at most one live [`Connection`] and turns concurrent
//! `connect()` calls into a single socket connect.
//!
//! # Single-flight Connect
//!
//! ```text
//! connect() ─┬─ live connection? ──────────────────► return it
//!            └─ register waiter ─┬─ already Connecting ─► await outcome
//!                                └─ spawn attempt ──────► await outcome
//! ```
//!
//! Every attempt and every `disconnect()` bumps a generation counter.
//! Outcomes and close notifications carrying an older generation are
//! discarded, so a stale attempt can never resurrect a connection the
//! caller already tore down.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::UnixStream;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{ConnectFailure, Error, Result};
use crate::protocol::Request;

use super::connection::{CloseHook, CloseReason, Connection};
use super::state::{ConnectionState, ConnectionStatus, LinkState};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for establishing the socket connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on simultaneously pending requests.
pub const DEFAULT_MAX_PENDING: usize = 100;

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns the connection to one socket path.
///
/// Thread-safe; share it behind an `Arc` or through [`crate::Client`].
pub struct ConnectionManager {
    /// Socket the manager connects to.
    socket_path: PathBuf,
    /// Timeout for a single connect attempt.
    connect_timeout: Duration,
    /// Pending-request cap handed to each connection.
    max_pending: usize,
    /// Shared state, also reached by attempts and close hooks.
    link: Arc<Mutex<LinkState>>,
}

// ============================================================================
// ConnectionManager - Constructor
// ============================================================================

impl ConnectionManager {
    /// Creates a manager with default limits. Does not connect.
    #[must_use]
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self::with_limits(socket_path, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_PENDING)
    }

    /// Creates a manager with explicit limits. Does not connect.
    #[must_use]
    pub fn with_limits(
        socket_path: impl Into<PathBuf>,
        connect_timeout: Duration,
        max_pending: usize,
    ) -> Self {
        Self {
            socket_path: socket_path.into(),
            connect_timeout,
            max_pending,
            link: Arc::new(Mutex::new(LinkState::default())),
        }
    }
}

// ============================================================================
// ConnectionManager - Public API
// ============================================================================

impl ConnectionManager {
    /// Returns the socket path.
    #[inline]
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Returns a status snapshot.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.link.lock().snapshot(self.socket_path.clone())
    }

    /// Returns `true` if a live connection exists.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.link.lock().live_connection().is_some()
    }

    /// Returns the number of requests awaiting a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.link
            .lock()
            .connection
            .as_ref()
            .map_or(0, Connection::pending_count)
    }

    /// Returns the live connection, establishing one if needed.
    ///
    /// Concurrent callers share one attempt and all observe its outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the socket cannot be opened
    /// - [`Error::ConnectionTimeout`] if the attempt exceeds the timeout
    /// - [`Error::Disconnected`] if `disconnect()` interrupted the attempt
    pub async fn connect(&self) -> Result<Connection> {
        self.connect_with(UnixStream::connect::<PathBuf>).await
    }

    /// [`connect`](Self::connect) with the socket opener supplied.
    async fn connect_with<F, Fut>(&self, open: F) -> Result<Connection>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = io::Result<UnixStream>> + Send + 'static,
    {
        let outcome_rx = {
            let mut link = self.link.lock();

            if let Some(connection) = link.live_connection() {
                return Ok(connection.clone());
            }

            let (outcome_tx, outcome_rx) = oneshot::channel();
            link.waiters.push(outcome_tx);

            if link.state != ConnectionState::Connecting {
                link.state = ConnectionState::Connecting;
                link.connection = None;
                link.generation += 1;

                debug!(
                    path = %self.socket_path.display(),
                    generation = link.generation,
                    "Starting connection attempt"
                );

                tokio::spawn(attempt(
                    open(self.socket_path.clone()),
                    self.socket_path.clone(),
                    Arc::downgrade(&self.link),
                    link.generation,
                    self.connect_timeout,
                    self.max_pending,
                ));
            }

            outcome_rx
        };

        match outcome_rx.await {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(failure)) => Err(failure.into()),
            Err(_) => Err(Error::Disconnected),
        }
    }

    /// Sends a request over the live connection, connecting first if
    /// needed.
    ///
    /// # Errors
    ///
    /// Any connect error, or any error from [`Connection::send`].
    pub async fn request(&self, request: Request, request_timeout: Duration) -> Result<Value> {
        let connection = self.connect().await?;
        connection.send(request, request_timeout).await
    }

    /// Tears down the connection.
    ///
    /// Fails in-flight connect waiters and pending requests with
    /// [`Error::Disconnected`] and returns the number of pending requests
    /// that were failed. Idempotent.
    pub async fn disconnect(&self) -> usize {
        let (connection, waiters) = {
            let mut link = self.link.lock();
            link.generation += 1;
            link.state = ConnectionState::Disconnected;
            (link.connection.take(), mem::take(&mut link.waiters))
        };

        if !waiters.is_empty() {
            debug!(count = waiters.len(), "Aborting connect waiters");
        }
        for waiter in waiters {
            let _ = waiter.send(Err(ConnectFailure::Aborted));
        }

        let failed = match connection {
            Some(connection) => connection.shutdown().await,
            None => 0,
        };

        info!(path = %self.socket_path.display(), failed, "Disconnected");
        failed
    }
}

// ============================================================================
// Connect Attempt
// ============================================================================

/// Opens the socket and publishes the outcome to every waiter.
async fn attempt(
    opening: impl Future<Output = io::Result<UnixStream>>,
    socket_path: PathBuf,
    link: Weak<Mutex<LinkState>>,
    generation: u64,
    connect_timeout: Duration,
    max_pending: usize,
) {
    let opened = match timeout(connect_timeout, opening).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ConnectFailure::Transport(format!(
            "{}: {e}",
            socket_path.display()
        ))),
        Err(_) => Err(ConnectFailure::Timeout(connect_timeout.as_millis() as u64)),
    };

    let Some(shared) = link.upgrade() else {
        return;
    };

    let (waiters, outcome) = {
        let mut state = shared.lock();

        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale attempt");
            return;
        }

        let outcome: StdResult<Connection, ConnectFailure> = match opened {
            Ok(stream) => {
                let connection =
                    Connection::spawn(stream, max_pending, close_hook(link.clone(), generation));
                state.state = ConnectionState::Connected;
                state.connection = Some(connection.clone());
                state.connected_at = Some(SystemTime::now());
                info!(path = %socket_path.display(), "Connected");
                Ok(connection)
            }
            Err(failure) => {
                let message = Error::from(failure.clone()).to_string();
                warn!(path = %socket_path.display(), error = %message, "Connection attempt failed");
                state.state = ConnectionState::Error;
                state.last_error = Some(message);
                Err(failure)
            }
        };

        (mem::take(&mut state.waiters), outcome)
    };

    for waiter in waiters {
        let _ = waiter.send(outcome.clone());
    }
}

/// Builds the hook the event loop calls when the socket goes away.
fn close_hook(link: Weak<Mutex<LinkState>>, generation: u64) -> CloseHook {
    Box::new(move |reason: &CloseReason| {
        let Some(shared) = link.upgrade() else {
            return;
        };
        let mut state = shared.lock();

        if state.generation != generation {
            return;
        }

        state.connection = None;
        match reason {
            CloseReason::PeerClosed => {
                state.state = ConnectionState::Disconnected;
                info!("Peer closed the connection");
            }
            CloseReason::SocketError(_) => {
                state.state = ConnectionState::Error;
                state.last_error = Some(reason.message());
                warn!(error = %reason.message(), "Connection failed");
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
