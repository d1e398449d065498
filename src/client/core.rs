//! Core Client struct, lifecycle and sending.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::protocol::{Command, Request};
use crate::transport::manager::DEFAULT_CONNECT_TIMEOUT;
use crate::transport::{ConnectionManager, ConnectionStatus};

use super::builder::ClientBuilder;
use super::options::ClientOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a client.
pub(crate) struct ClientInner {
    /// Identifies this client in logs.
    pub id: Uuid,
    /// Validated settings.
    pub options: ClientOptions,
    /// Socket lifecycle and request correlation.
    pub manager: ConnectionManager,
}

// ============================================================================
// Client
// ============================================================================

/// A handle to the GUI peer's control socket.
///
/// Cheap to clone; clones share one connection. Every command method
/// connects on demand, so calling [`connect`](Self::connect) first is
/// optional.
///
/// # Example
///
/// ```no_run
/// use gui_bridge::Client;
///
/// # async fn example() -> gui_bridge::Result<()> {
/// let client = Client::with_socket_path("/tmp/openflow-mcp.sock");
/// assert_eq!(client.ping().await?, "pong");
///
/// let title: String = client.evaluate("document.title").await?;
/// client.click(120.0, 48.0).await?;
/// client.disconnect().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.inner.id)
            .field("socket_path", &self.inner.options.socket_path)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl Client {
    /// Creates a client from options. Does not connect.
    ///
    /// Options are not validated; use [`Client::builder`] for that.
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        let manager = ConnectionManager::with_limits(
            options.socket_path.clone(),
            DEFAULT_CONNECT_TIMEOUT,
            options.max_pending_requests,
        );

        Self {
            inner: Arc::new(ClientInner {
                id: Uuid::new_v4(),
                options,
                manager,
            }),
        }
    }

    /// Creates a client for `path` with default timeouts.
    #[must_use]
    pub fn with_socket_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ClientOptions::new().with_socket_path(path))
    }

    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

// ============================================================================
// Client - Accessors
// ============================================================================

impl Client {
    /// Returns the client ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Returns the socket path.
    #[inline]
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.inner.options.socket_path
    }
}

// ============================================================================
// Client - Lifecycle
// ============================================================================

impl Client {
    /// Connects if not already connected.
    ///
    /// Concurrent callers share one connection attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`](crate::Error::Connection) if the socket cannot be opened
    /// - [`Error::ConnectionTimeout`](crate::Error::ConnectionTimeout) after 5 seconds
    pub async fn connect(&self) -> Result<()> {
        self.inner.manager.connect().await?;
        Ok(())
    }

    /// Closes the connection and fails every pending request.
    ///
    /// Safe to call in any state.
    pub async fn disconnect(&self) {
        let failed = self.inner.manager.disconnect().await;
        debug!(client_id = %self.inner.id, failed, "Client disconnected");
    }

    /// Returns `true` if a live connection exists.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.manager.is_connected()
    }

    /// Returns a status snapshot.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.inner.manager.status()
    }

    /// Returns the number of requests awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.manager.pending_count()
    }
}

// ============================================================================
// Client - Sending
// ============================================================================

impl Client {
    /// Sends a typed command with an explicit timeout and returns the
    /// response data.
    ///
    /// # Errors
    ///
    /// Connect, write, application, timeout and disconnection errors as
    /// described on [`Error`](crate::Error).
    pub async fn send(&self, command: Command, timeout: Duration) -> Result<Value> {
        let request = Request::from_command(&command)?;
        self.dispatch(request, timeout).await
    }

    /// Sends a typed command with the default command timeout.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_command(&self, command: Command) -> Result<Value> {
        self.send(command, self.inner.options.command_timeout).await
    }

    /// Sends a command by name with an arbitrary payload.
    ///
    /// For commands the typed catalogue does not cover.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_raw(&self, command: &str, payload: Value, timeout: Duration) -> Result<Value> {
        self.dispatch(Request::new(command, payload), timeout).await
    }

    /// Checks that the peer answers.
    ///
    /// Returns `data.value`, or `"pong"` when the peer omits it.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn ping(&self) -> Result<String> {
        let data = self.send_command(Command::Ping {}).await?;

        let value = data
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or("pong")
            .to_string();
        Ok(value)
    }

    async fn dispatch(&self, request: Request, timeout: Duration) -> Result<Value> {
        let command = request.command.clone();
        debug!(
            client_id = %self.inner.id,
            command = %command,
            timeout_ms = timeout.as_millis() as u64,
            "Sending command"
        );

        let result = self.inner.manager.request(request, timeout).await;

        if let Err(e) = &result {
            debug!(client_id = %self.inner.id, command = %command, error = %e, "Command failed");
        }
        result
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::error::Error;
    use crate::identifiers::WindowLabel;
    use crate::protocol::Response;
    use crate::testing::{Action, MockPeer};
    use crate::transport::ConnectionState;

    #[test]
    fn test_client_is_clone_and_debug() {
        fn assert_clone<T: Clone>() {}
        fn assert_debug<T: fmt::Debug>() {}
        assert_clone::<Client>();
        assert_debug::<Client>();
    }

    #[test]
    fn test_clients_have_distinct_ids() {
        let a = Client::default();
        let b = Client::default();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[tokio::test]
    async fn test_ping_auto_connects() {
        let peer = MockPeer::replying(json!({"value": "pong"}));
        let client = Client::with_socket_path(peer.path());
        assert!(!client.is_connected());

        assert_eq!(client.ping().await.expect("ping"), "pong");

        assert!(client.is_connected());
        assert_eq!(peer.commands(), ["PING"]);
        assert_eq!(peer.last_payload(), json!({}));
    }

    #[tokio::test]
    async fn test_send_typed_command() -> anyhow::Result<()> {
        let peer = MockPeer::echo();
        let client = Client::with_socket_path(peer.path());

        let data = client
            .send(
                Command::GetDom {
                    window_label: WindowLabel::new("settings"),
                },
                Duration::from_secs(1),
            )
            .await?;

        assert_eq!(data, json!({"window_label": "settings"}));
        assert_eq!(peer.commands(), ["GET_DOM"]);
        assert_eq!(client.pending_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_ping_falls_back_to_pong() {
        let peer = MockPeer::replying(json!(null));
        let client = Client::with_socket_path(peer.path());

        assert_eq!(client.ping().await.expect("ping"), "pong");
    }

    #[tokio::test]
    async fn test_ping_returns_peer_value() {
        let peer = MockPeer::replying(json!({"value": "alive"}));
        let client = Client::with_socket_path(peer.path());

        assert_eq!(client.ping().await.expect("ping"), "alive");
    }

    #[tokio::test]
    async fn test_send_raw_timeout_message() {
        let peer = MockPeer::silent();
        let client = Client::with_socket_path(peer.path());

        let err = client
            .send_raw("GET_DOM", json!({"window_label": "main"}), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        let message = err.to_string();
        assert!(message.contains("GET_DOM"), "{message}");
        assert!(message.contains("50"), "{message}");
    }

    #[tokio::test]
    async fn test_application_failure_message() {
        let peer = MockPeer::failing("element not found");
        let client = Client::with_socket_path(peer.path());

        let err = client
            .send_raw("GET_ELEMENT_POSITION", json!({}), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(err.is_application_error());
        assert_eq!(err.to_string(), "element not found");
    }

    #[tokio::test]
    async fn test_application_failure_without_message() {
        let peer = MockPeer::start(|_| {
            vec![Action::Raw(
                "{\"success\":false,\"data\":null,\"error\":null}\n".to_string(),
            )]
        });
        let client = Client::with_socket_path(peer.path());

        let err = client
            .send_raw("MANAGE_WINDOW", json!({}), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "MANAGE_WINDOW failed");
    }

    #[tokio::test]
    async fn test_mid_flight_close_is_disconnection() {
        let peer = MockPeer::start(|request| match request.command.as_str() {
            "SECOND" => vec![Action::Close],
            _ => Vec::new(),
        });
        let client = Client::with_socket_path(peer.path());

        let timeout = Duration::from_secs(5);
        let (first, second) = tokio::join!(
            client.send_raw("FIRST", json!({}), timeout),
            client.send_raw("SECOND", json!({}), timeout),
        );

        for result in [first, second] {
            let err = result.unwrap_err();
            assert!(err.is_disconnection(), "{err}");
            assert!(!err.is_timeout(), "{err}");
        }
    }

    #[tokio::test]
    async fn test_fifo_over_concurrent_calls() {
        let peer = MockPeer::start(|request| {
            // Later commands answer faster, yet replies stay in send order
            let delay = match request.payload["n"].as_u64() {
                Some(0) => 30,
                Some(1) => 10,
                _ => 0,
            };
            vec![
                Action::Sleep(Duration::from_millis(delay)),
                Action::Reply(Response::ok(request.payload["n"].clone())),
            ]
        });
        let client = Client::with_socket_path(peer.path());

        let timeout = Duration::from_secs(5);
        let (a, b, c) = tokio::join!(
            client.send_raw("ECHO", json!({"n": 0}), timeout),
            client.send_raw("ECHO", json!({"n": 1}), timeout),
            client.send_raw("ECHO", json!({"n": 2}), timeout),
        );

        assert_eq!(a.expect("a"), json!(0));
        assert_eq!(b.expect("b"), json!(1));
        assert_eq!(c.expect("c"), json!(2));
    }

    #[tokio::test]
    async fn test_usable_after_errors() {
        let peer = MockPeer::start(|request| match request.command.as_str() {
            "SLOW" => Vec::new(),
            "BAD" => vec![Action::Reply(Response::failure("nope"))],
            _ => vec![Action::Reply(Response::ok(json!({"value": "pong"})))],
        });
        let client = Client::with_socket_path(peer.path());

        let err = client
            .send_raw("BAD", json!({}), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_application_error());

        client.disconnect().await;
        assert_eq!(client.status().state, ConnectionState::Disconnected);

        assert_eq!(client.ping().await.expect("ping"), "pong");
        assert_eq!(peer.accepts(), 2);
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = Client::with_socket_path(dir.path().join("absent.sock"));

        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }), "{err}");

        let status = client.status();
        assert_eq!(status.state, ConnectionState::Error);
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_disconnect_when_never_connected() {
        let client = Client::default();
        client.disconnect().await;
        client.disconnect().await;
        assert_eq!(client.status().state, ConnectionState::Disconnected);
    }
}
