//! Unix socket connection and event loop.
//!
//! This module owns one live socket to the GUI peer, including
//! request/response correlation and per-request timeouts.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that is the only owner of:
//!
//! - The socket read half
//! - The pending-request queue
//! - The inbound line buffer
//!
//! Callers reach it through a command channel. Responses, timeouts and
//! teardown are all processed in that one task, so every pending request
//! is resolved exactly once.
//!
//! Writes go through a separate writer task fed by a channel. A peer that
//! stops reading blocks only the writer; the event loop keeps reading,
//! expiring deadlines and handling shutdown. Write failures are reported
//! back to the event loop, which fails the matching request.
//!
//! # Correlation
//!
//! The wire carries no request identifiers. The peer executes one command
//! at a time and answers in the order commands arrived, so each decoded
//! response resolves the oldest pending request. A response that arrives
//! after its request timed out is therefore matched to the next-oldest
//! request; the protocol offers no way to tell the two apart.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestSeq;
use crate::protocol::codec::{self, LineBuffer};
use crate::protocol::{Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Bytes read from the socket per wakeup.
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Placeholder deadline while no request is pending.
const IDLE_TIMER: Duration = Duration::from_secs(3600);

/// Deadline offset used when `now + timeout` overflows (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// ============================================================================
// Types
// ============================================================================

/// Completion handle of one pending request.
type ResponseSender = oneshot::Sender<Result<Value>>;

/// Called once when the peer closes the socket or the socket fails.
///
/// Not called for an explicit [`Connection::shutdown`].
pub(crate) type CloseHook = Box<dyn FnOnce(&CloseReason) + Send + 'static>;

/// Why the event loop stopped without being asked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed its end.
    PeerClosed,
    /// Reading from the socket failed.
    SocketError(String),
}

impl CloseReason {
    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::PeerClosed => "peer closed the connection".to_string(),
            Self::SocketError(e) => format!("socket error: {e}"),
        }
    }
}

/// One sent-but-unresolved command.
struct PendingRequest {
    /// Command name, for errors and logs.
    command: String,
    /// Configured timeout.
    timeout: Duration,
    /// When the request expires.
    deadline: Instant,
    /// Resolved exactly once.
    response_tx: ResponseSender,
}

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Queue a request and write it.
    Send {
        request: Request,
        timeout: Duration,
        response_tx: ResponseSender,
    },
    /// Close the socket and fail everything pending.
    Shutdown { done_tx: oneshot::Sender<usize> },
}

/// One encoded command line for the writer task.
struct Outbound {
    seq: RequestSeq,
    command: String,
    line: Vec<u8>,
}

/// Reported by the writer task when a line could not be written.
struct WriteFailure {
    seq: RequestSeq,
    message: String,
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to a live socket connection.
///
/// Cheap to clone; all clones talk to the same event loop.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Pending queue length, mirrored by the event loop.
    pending: Arc<AtomicUsize>,
}

impl Connection {
    /// Creates a connection from an open stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn spawn(stream: UnixStream, max_pending: usize, on_close: CloseHook) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let (reader, writer) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (failure_tx, failure_rx) = mpsc::unbounded_channel();

        let event_loop = EventLoop {
            reader,
            outbound_tx,
            write_failures: failure_rx,
            writer_task: tokio::spawn(writer_task(writer, outbound_rx, failure_tx)),
            command_rx,
            queue: BTreeMap::new(),
            buffer: LineBuffer::new(),
            pending: Arc::clone(&pending),
            max_pending,
        };
        tokio::spawn(event_loop.run(on_close));

        Self {
            command_tx,
            pending,
        }
    }

    /// Sends a request and waits for its response.
    ///
    /// The timeout is enforced by the event loop, which removes the
    /// request from the queue when it fires. Dropping the returned future
    /// does not dequeue the request; its eventual response is still
    /// consumed in order.
    ///
    /// # Errors
    ///
    /// - [`Error::Application`] if the peer answered `success=false`
    /// - [`Error::RequestTimeout`] if no response arrived in time
    /// - [`Error::Write`] if the command could not be written
    /// - [`Error::Disconnected`] / [`Error::ConnectionLost`] on teardown
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send(&self, request: Request, timeout: Duration) -> Result<Value> {
        let (response_tx, response_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Send {
                request,
                timeout,
                response_tx,
            })
            .map_err(|_| Error::connection_lost("event loop stopped"))?;

        response_rx
            .await
            .map_err(|_| Error::connection_lost("event loop stopped"))?
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Returns `true` once the event loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Closes the socket and fails every pending request with
    /// [`Error::Disconnected`].
    ///
    /// Returns after the queue is drained, with the number of requests
    /// that were failed. Returns 0 if the loop had already stopped.
    pub async fn shutdown(&self) -> usize {
        let (done_tx, done_rx) = oneshot::channel();
        if self
            .command_tx
            .send(ConnectionCommand::Shutdown { done_tx })
            .is_err()
        {
            return 0;
        }
        done_rx.await.unwrap_or(0)
    }
}

// ============================================================================
// EventLoop
// ============================================================================

/// State owned by the event loop task.
struct EventLoop {
    reader: OwnedReadHalf,
    /// Lines for the writer task, in send order.
    outbound_tx: mpsc::UnboundedSender<Outbound>,
    write_failures: mpsc::UnboundedReceiver<WriteFailure>,
    writer_task: JoinHandle<()>,
    command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    /// Pending requests; ascending sequence order is send order.
    queue: BTreeMap<RequestSeq, PendingRequest>,
    buffer: LineBuffer,
    pending: Arc<AtomicUsize>,
    max_pending: usize,
}

impl EventLoop {
    /// Runs until shutdown, peer close, socket error, or all handles drop.
    async fn run(mut self, on_close: CloseHook) {
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        let reason = loop {
            let deadline = self.next_deadline();

            // Commands before reads: a reply never precedes its queued request
            tokio::select! {
                biased;

                // Commands from the client
                command = self.command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, timeout, response_tx }) => {
                            self.handle_send(request, timeout, response_tx);
                        }

                        Some(ConnectionCommand::Shutdown { done_tx }) => {
                            debug!("Shutdown command received");
                            self.writer_task.abort();
                            let failed = self.fail_all(|| Error::Disconnected)
                                + self.drain_commands(|| Error::Disconnected);
                            let _ = done_tx.send(failed);
                            break None;
                        }

                        None => {
                            debug!("Command channel closed");
                            self.fail_all(|| Error::Disconnected);
                            break None;
                        }
                    }
                }

                // Lines the writer task could not deliver
                Some(failure) = self.write_failures.recv() => {
                    self.handle_write_failure(failure);
                }

                // Incoming bytes from the peer
                read = self.reader.read(&mut chunk) => {
                    match read {
                        Ok(0) => {
                            debug!("Socket closed by peer");
                            break Some(CloseReason::PeerClosed);
                        }
                        Ok(n) => self.handle_data(&chunk[..n]),
                        Err(e) => {
                            error!(error = %e, "Socket read failed");
                            break Some(CloseReason::SocketError(e.to_string()));
                        }
                    }
                }

                // Earliest request deadline
                () = sleep_until(deadline.unwrap_or_else(|| Instant::now() + IDLE_TIMER)),
                    if deadline.is_some() =>
                {
                    self.expire_due();
                }
            }
        };

        self.writer_task.abort();
        self.buffer.clear();

        if let Some(reason) = reason {
            let message = reason.message();
            let failed = self.fail_all(|| Error::connection_lost(message.clone()))
                + self.drain_commands(|| Error::connection_lost(message.clone()));
            debug!(failed, reason = %message, "Connection lost");
            on_close(&reason);
        }

        debug!("Event loop terminated");
    }

    /// Queues one request and hands its line to the writer task.
    fn handle_send(
        &mut self,
        request: Request,
        timeout: Duration,
        response_tx: ResponseSender,
    ) {
        if self.queue.len() >= self.max_pending {
            warn!(
                pending = self.queue.len(),
                max = self.max_pending,
                "Too many pending requests"
            );
            let _ = response_tx.send(Err(Error::protocol(format!(
                "Too many pending requests: {}/{}",
                self.queue.len(),
                self.max_pending
            ))));
            return;
        }

        let line = match codec::encode(&request.command, &request.payload) {
            Ok(line) => line,
            Err(e) => {
                let _ = response_tx.send(Err(e));
                return;
            }
        };

        // Queue before writing so a fast reply always finds its request
        let seq = RequestSeq::next();
        self.queue.insert(
            seq,
            PendingRequest {
                command: request.command.clone(),
                timeout,
                deadline: deadline_after(timeout),
                response_tx,
            },
        );
        self.sync_pending();

        trace!(
            %seq,
            command = %request.command,
            bytes = line.len(),
            timeout_ms = timeout.as_millis() as u64,
            "Command queued"
        );

        let outbound = Outbound {
            seq,
            command: request.command,
            line,
        };
        if self.outbound_tx.send(outbound).is_err() {
            self.handle_write_failure(WriteFailure {
                seq,
                message: "writer stopped".to_string(),
            });
        }
    }

    /// Fails the request whose line could not be written.
    ///
    /// The request may already have timed out, in which case nothing is
    /// left to fail.
    fn handle_write_failure(&mut self, failure: WriteFailure) {
        let Some(pending) = self.queue.remove(&failure.seq) else {
            return;
        };
        self.sync_pending();

        warn!(
            seq = %failure.seq,
            command = %pending.command,
            error = %failure.message,
            "Failed to write command"
        );
        let _ = pending
            .response_tx
            .send(Err(Error::write(pending.command, failure.message)));
    }

    /// Splits incoming bytes into lines and resolves requests.
    fn handle_data(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);

        while let Some(line) = self.buffer.next_line() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match codec::decode(&line) {
                Ok(response) => self.resolve_oldest(response),
                Err(e) => warn!(error = %e, len = line.len(), "Dropping malformed line"),
            }
        }
    }

    /// Resolves the oldest pending request with `response`.
    fn resolve_oldest(&mut self, response: Response) {
        let Some((seq, pending)) = self.queue.pop_first() else {
            warn!(
                success = response.success,
                "Response with no pending request, dropping"
            );
            return;
        };
        self.sync_pending();

        trace!(%seq, command = %pending.command, success = response.success, "Response matched");

        // The caller may have gone away; the response is consumed regardless
        let _ = pending
            .response_tx
            .send(response.into_result(&pending.command));
    }

    /// Fails every request whose deadline has passed.
    fn expire_due(&mut self) {
        let now = Instant::now();
        let expired: Vec<RequestSeq> = self
            .queue
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(seq, _)| *seq)
            .collect();

        for seq in expired {
            if let Some(pending) = self.queue.remove(&seq) {
                let timeout_ms = pending.timeout.as_millis() as u64;
                warn!(%seq, command = %pending.command, timeout_ms, "Command timed out");
                let _ = pending
                    .response_tx
                    .send(Err(Error::request_timeout(pending.command, timeout_ms)));
            }
        }

        self.sync_pending();
    }

    /// Returns the earliest deadline in the queue.
    fn next_deadline(&self) -> Option<Instant> {
        self.queue.values().map(|pending| pending.deadline).min()
    }

    /// Fails and removes every pending request.
    fn fail_all(&mut self, make_error: impl Fn() -> Error) -> usize {
        let queue = mem::take(&mut self.queue);
        let count = queue.len();

        for (_, pending) in queue {
            let _ = pending.response_tx.send(Err(make_error()));
        }
        self.sync_pending();

        if count > 0 {
            debug!(count, "Failed pending requests");
        }
        count
    }

    /// Fails `Send` commands still waiting in the channel.
    fn drain_commands(&mut self, make_error: impl Fn() -> Error) -> usize {
        self.command_rx.close();

        let mut count = 0;
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                ConnectionCommand::Send { response_tx, .. } => {
                    let _ = response_tx.send(Err(make_error()));
                    count += 1;
                }
                ConnectionCommand::Shutdown { done_tx } => {
                    let _ = done_tx.send(0);
                }
            }
        }
        count
    }

    fn sync_pending(&self) {
        self.pending.store(self.queue.len(), Ordering::Release);
    }
}

// ============================================================================
// Writer Task
// ============================================================================

/// Writes queued lines in order until the event loop goes away.
///
/// After the first failure the socket is treated as broken: later lines are
/// not written and are reported as failed with the same error.
async fn writer_task(
    mut writer: OwnedWriteHalf,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    failure_tx: mpsc::UnboundedSender<WriteFailure>,
) {
    let mut broken: Option<String> = None;

    while let Some(outbound) = outbound_rx.recv().await {
        if broken.is_none() {
            let written = match writer.write_all(&outbound.line).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            };

            match written {
                Ok(()) => {
                    trace!(seq = %outbound.seq, command = %outbound.command, "Command written");
                    continue;
                }
                Err(e) => {
                    error!(command = %outbound.command, error = %e, "Socket write failed");
                    broken = Some(e.to_string());
                }
            }
        }

        let message = broken.clone().unwrap_or_default();
        if failure_tx
            .send(WriteFailure {
                seq: outbound.seq,
                message,
            })
            .is_err()
        {
            break;
        }
    }
}

/// Returns `now + timeout`, saturating far in the future on overflow.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex as StdMutex;

    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::unix::OwnedReadHalf as PeerReader;

    fn ping(tag: &str) -> Request {
        Request::new("PING", json!({ "tag": tag }))
    }

    fn connect_pair(max_pending: usize) -> (Connection, UnixStream) {
        let (client, peer) = UnixStream::pair().expect("socket pair");
        let connection = Connection::spawn(client, max_pending, Box::new(|_: &CloseReason| {}));
        (connection, peer)
    }

    async fn read_command(reader: &mut BufReader<PeerReader>) -> Value {
        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read");
        serde_json::from_str(&line).expect("command json")
    }

    #[tokio::test]
    async fn test_fifo_correlation() {
        let (connection, peer) = connect_pair(100);
        let (peer_read, mut peer_write) = peer.into_split();
        let mut peer_read = BufReader::new(peer_read);

        let peer_task = tokio::spawn(async move {
            let mut tags = Vec::new();
            for _ in 0..3 {
                let command = read_command(&mut peer_read).await;
                tags.push(command["payload"]["tag"].as_str().unwrap_or_default().to_string());
            }
            for tag in &tags {
                let line = format!("{{\"success\":true,\"data\":\"{tag}\",\"error\":null}}\n");
                peer_write.write_all(line.as_bytes()).await.expect("write");
            }
            (tags, peer_read, peer_write)
        });

        let timeout = Duration::from_secs(5);
        let (a, b, c) = tokio::join!(
            connection.send(ping("first"), timeout),
            connection.send(ping("second"), timeout),
            connection.send(ping("third"), timeout),
        );

        assert_eq!(a.expect("first"), json!("first"));
        assert_eq!(b.expect("second"), json!("second"));
        assert_eq!(c.expect("third"), json!("third"));

        let (tags, _, _) = peer_task.await.expect("peer");
        assert_eq!(tags, ["first", "second", "third"]);
        assert_eq!(connection.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_wire_format() {
        let (connection, peer) = connect_pair(100);
        let mut peer = BufReader::new(peer);

        let send = connection.send(
            Request::new("GET_DOM", json!({"window_label": "main"})),
            Duration::from_millis(50),
        );
        let read = async {
            let mut line = String::new();
            peer.read_line(&mut line).await.expect("read");
            line
        };
        let (_, line) = tokio::join!(send, read);

        assert_eq!(
            line,
            "{\"command\":\"GET_DOM\",\"payload\":{\"window_label\":\"main\"}}\n"
        );
    }

    #[tokio::test]
    async fn test_timeout_names_command_and_duration() {
        let (connection, _peer) = connect_pair(100);

        let err = connection
            .send(ping("slow"), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RequestTimeout { .. }));
        let text = err.to_string();
        assert!(text.contains("PING"), "{text}");
        assert!(text.contains("50"), "{text}");
        assert_eq!(connection.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_late_response_is_consumed_by_next_oldest() {
        let (connection, mut peer) = connect_pair(100);

        let first = connection
            .send(ping("first"), Duration::from_millis(30))
            .await;
        assert!(first.unwrap_err().is_timeout());

        let second = connection.send(ping("second"), Duration::from_secs(5));
        let reply = async {
            peer.write_all(b"{\"success\":true,\"data\":\"late-for-first\",\"error\":null}\n")
                .await
                .expect("write");
        };
        let (second, ()) = tokio::join!(second, reply);

        assert_eq!(second.expect("second"), json!("late-for-first"));
    }

    #[tokio::test]
    async fn test_application_error() {
        let (connection, mut peer) = connect_pair(100);

        let send = connection.send(
            Request::new("GET_ELEMENT_POSITION", json!({})),
            Duration::from_secs(5),
        );
        let reply = async {
            peer.write_all(b"{\"success\":false,\"data\":null,\"error\":\"element not found\"}\n")
                .await
                .expect("write");
        };
        let (result, ()) = tokio::join!(send, reply);

        let err = result.unwrap_err();
        assert!(err.is_application_error());
        assert_eq!(err.to_string(), "element not found");
    }

    #[tokio::test]
    async fn test_malformed_and_blank_lines_are_ignored() {
        let (connection, mut peer) = connect_pair(100);

        let send = connection.send(ping("x"), Duration::from_secs(5));
        let reply = async {
            peer.write_all(b"[peer] debug output\n\n{\"success\":tr")
                .await
                .expect("write");
            peer.write_all(b"ue,\"data\":7}\n").await.expect("write");
        };
        let (result, ()) = tokio::join!(send, reply);

        assert_eq!(result.expect("ok"), json!(7));
    }

    #[tokio::test]
    async fn test_unsolicited_response_is_dropped() {
        let (connection, mut peer) = connect_pair(100);

        peer.write_all(b"{\"success\":true,\"data\":\"stray\"}\n")
            .await
            .expect("write");
        tokio::time::sleep(Duration::from_millis(20)).await;

        let send = connection.send(ping("x"), Duration::from_secs(5));
        let reply = async {
            peer.write_all(b"{\"success\":true,\"data\":\"mine\"}\n")
                .await
                .expect("write");
        };
        let (result, ()) = tokio::join!(send, reply);

        assert_eq!(result.expect("ok"), json!("mine"));
    }

    #[tokio::test]
    async fn test_peer_close_fails_pending_with_connection_lost() {
        let (client, peer) = UnixStream::pair().expect("socket pair");
        let reasons = Arc::new(StdMutex::new(Vec::new()));
        let hook_reasons = Arc::clone(&reasons);
        let connection = Connection::spawn(
            client,
            100,
            Box::new(move |reason: &CloseReason| {
                hook_reasons
                    .lock()
                    .expect("lock")
                    .push(reason.clone());
            }),
        );

        let (peer_read, peer_write) = peer.into_split();
        let mut peer_read = BufReader::new(peer_read);
        let close = async move {
            read_command(&mut peer_read).await;
            read_command(&mut peer_read).await;
            drop(peer_write);
            drop(peer_read);
        };

        let timeout = Duration::from_secs(5);
        let (a, b, ()) = tokio::join!(
            connection.send(ping("a"), timeout),
            connection.send(ping("b"), timeout),
            close,
        );

        for result in [a, b] {
            let err = result.unwrap_err();
            assert!(err.is_disconnection(), "{err}");
            assert!(!err.is_timeout());
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(connection.is_closed());
        assert_eq!(
            *reasons.lock().expect("lock"),
            vec![CloseReason::PeerClosed]
        );
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let (connection, _peer) = connect_pair(100);

        let timeout = Duration::from_secs(5);
        let a = tokio::spawn({
            let connection = connection.clone();
            async move { connection.send(ping("a"), timeout).await }
        });
        let b = tokio::spawn({
            let connection = connection.clone();
            async move { connection.send(ping("b"), timeout).await }
        });

        while connection.pending_count() < 2 {
            tokio::task::yield_now().await;
        }

        assert_eq!(connection.shutdown().await, 2);
        assert_eq!(connection.pending_count(), 0);

        for handle in [a, b] {
            let err = handle.await.expect("join").unwrap_err();
            assert!(matches!(err, Error::Disconnected));
        }

        // Second shutdown is a no-op
        assert_eq!(connection.shutdown().await, 0);
    }

    #[tokio::test]
    async fn test_pending_limit() {
        let (connection, _peer) = connect_pair(1);

        let first = connection.send(ping("a"), Duration::from_millis(200));
        let second = connection.send(ping("b"), Duration::from_millis(200));
        let (first, second) = tokio::join!(first, second);

        assert!(first.unwrap_err().is_timeout());
        assert!(matches!(second.unwrap_err(), Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_blocked_write_does_not_stall_loop() {
        let (connection, mut peer) = connect_pair(100);

        // Far larger than the socket buffer; the peer never reads it
        let large = Request::new("EXECUTE_JS", json!({ "code": "x".repeat(8 * 1024 * 1024) }));
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            connection.send(large, Duration::from_millis(100)),
        )
        .await
        .expect("request timeout fired while the write was blocked");
        assert!(result.unwrap_err().is_timeout());

        // Replies are still read while the writer is stuck
        let small = connection.send(ping("small"), Duration::from_secs(5));
        let reply = async {
            peer.write_all(b"{\"success\":true,\"data\":1}\n")
                .await
                .expect("write");
        };
        let (small, ()) = tokio::join!(small, reply);
        assert_eq!(small.expect("small"), json!(1));

        let drained = tokio::time::timeout(Duration::from_secs(2), connection.shutdown())
            .await
            .expect("shutdown while the write was blocked");
        assert_eq!(drained, 0);
    }

    #[tokio::test]
    async fn test_unbounded_timeout_is_accepted() {
        let (connection, mut peer) = connect_pair(100);

        let bounded = connection.send(ping("a"), Duration::from_secs(5));
        let unbounded = connection.send(ping("b"), Duration::MAX);
        let reply = async {
            peer.write_all(b"{\"success\":true,\"data\":\"a\"}\n{\"success\":true,\"data\":\"b\"}\n")
                .await
                .expect("write");
        };
        let (a, b, ()) = tokio::join!(bounded, unbounded, reply);

        assert_eq!(a.expect("bounded"), json!("a"));
        assert_eq!(b.expect("unbounded"), json!("b"));
        assert!(!connection.is_closed());
    }

    #[tokio::test]
    async fn test_write_failure_fails_request() {
        let (connection, peer) = connect_pair(100);
        let peer = peer.into_std().expect("std stream");
        peer.shutdown(std::net::Shutdown::Read).expect("shutdown read");

        let err = connection
            .send(ping("x"), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Write { .. }), "{err}");
        assert!(err.to_string().contains("PING"), "{err}");
        assert_eq!(connection.pending_count(), 0);
        assert!(!connection.is_closed());
    }

    #[tokio::test]
    async fn test_shutdown_fails_queued_sends_as_disconnected() {
        let (connection, _peer) = connect_pair(100);

        // Both land in the channel before the event loop first runs
        let (done_tx, done_rx) = oneshot::channel();
        let (response_tx, response_rx) = oneshot::channel();
        let shutdown = connection
            .command_tx
            .send(ConnectionCommand::Shutdown { done_tx });
        let send = connection.command_tx.send(ConnectionCommand::Send {
            request: ping("queued"),
            timeout: Duration::from_secs(5),
            response_tx,
        });
        assert!(shutdown.is_ok() && send.is_ok());

        assert_eq!(done_rx.await.expect("done"), 1);
        let err = response_rx.await.expect("resolved").unwrap_err();
        assert!(matches!(err, Error::Disconnected), "{err}");
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (connection, peer) = connect_pair(100);
        drop(peer);

        while !connection.is_closed() {
            tokio::task::yield_now().await;
        }

        let err = connection
            .send(ping("late"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.is_disconnection());
    }
}
