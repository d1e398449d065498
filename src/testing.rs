//! In-process mock of the GUI peer for tests.
//!
//! Binds a Unix socket in a temporary directory, accepts any number of
//! connections, records every command it receives and answers according
//! to a handler closure. Each connection is served sequentially, like the
//! real peer.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

use crate::protocol::{Request, Response};

// ============================================================================
// Types
// ============================================================================

/// What the peer does after reading one command.
#[derive(Debug, Clone)]
pub(crate) enum Action {
    /// Write a response envelope.
    Reply(Response),
    /// Write raw bytes; no newline is appended.
    Raw(String),
    /// Pause before the next action.
    Sleep(Duration),
    /// Close the connection.
    Close,
}

type Handler = dyn Fn(&Request) -> Vec<Action> + Send + Sync + 'static;

// ============================================================================
// MockPeer
// ============================================================================

pub(crate) struct MockPeer {
    _dir: TempDir,
    path: PathBuf,
    accepts: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Request>>>,
    task: JoinHandle<()>,
}

impl MockPeer {
    /// Starts a peer driven by `handler`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Vec<Action> + Send + Sync + 'static,
    {
        // Short prefix under /tmp keeps the path within sun_path limits
        let dir = tempfile::Builder::new()
            .prefix("gb")
            .tempdir_in("/tmp")
            .expect("tempdir");
        let path = dir.path().join("peer.sock");
        let listener = UnixListener::bind(&path).expect("bind mock peer");

        let accepts = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&accepts),
            Arc::clone(&received),
            handler,
        ));

        Self {
            _dir: dir,
            path,
            accepts,
            received,
            task,
        }
    }

    /// Answers every command with its own payload.
    pub fn echo() -> Self {
        Self::start(|request| vec![Action::Reply(Response::ok(request.payload.clone()))])
    }

    /// Answers every command with the same data.
    pub fn replying(data: Value) -> Self {
        Self::start(move |_| vec![Action::Reply(Response::ok(data.clone()))])
    }

    /// Answers every command with a failure.
    pub fn failing(message: &'static str) -> Self {
        Self::start(move |_| vec![Action::Reply(Response::failure(message))])
    }

    /// Reads commands and never answers.
    pub fn silent() -> Self {
        Self::start(|_| Vec::new())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn accepts(&self) -> usize {
        self.accepts.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Request> {
        self.received.lock().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .map(|request| request.command.clone())
            .collect()
    }

    /// Payload of the most recent command.
    pub fn last_payload(&self) -> Value {
        self.received
            .lock()
            .last()
            .map_or_else(|| json!(null), |request| request.payload.clone())
    }

    /// Waits until at least `count` commands have arrived.
    pub async fn wait_for_commands(&self, count: usize) {
        while self.received.lock().len() < count {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

impl Drop for MockPeer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Serving
// ============================================================================

async fn accept_loop(
    listener: UnixListener,
    accepts: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Request>>>,
    handler: Arc<Handler>,
) {
    let mut connections = Vec::new();

    while let Ok((stream, _)) = listener.accept().await {
        accepts.fetch_add(1, Ordering::SeqCst);
        connections.push(tokio::spawn(serve(
            stream,
            Arc::clone(&received),
            Arc::clone(&handler),
        )));
    }

    for connection in connections {
        connection.abort();
    }
}

async fn serve(stream: UnixStream, received: Arc<Mutex<Vec<Request>>>, handler: Arc<Handler>) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(request) = serde_json::from_str::<Request>(&line) else {
            continue;
        };
        received.lock().push(request.clone());

        for action in handler(&request) {
            match action {
                Action::Reply(response) => {
                    let mut bytes = serde_json::to_vec(&response).expect("response json");
                    bytes.push(b'\n');
                    if writer.write_all(&bytes).await.is_err() {
                        return;
                    }
                }
                Action::Raw(text) => {
                    if writer.write_all(text.as_bytes()).await.is_err() {
                        return;
                    }
                }
                Action::Sleep(duration) => tokio::time::sleep(duration).await,
                Action::Close => return,
            }
        }
    }
}
