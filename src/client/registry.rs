//! Clients keyed by socket path.
//!
//! One [`Client`] per peer. The application owns the registry and passes
//! it where it is needed; there is no process-wide instance.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            ClientRegistry               │
//! │  ┌─────────────────────────────────┐    │
//! │  │ /tmp/openflow-mcp.sock → Client │    │
//! │  │ /tmp/second.sock       → Client │    │
//! │  └─────────────────────────────────┘    │
//! └─────────────────────────────────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::core::Client;
use super::options::ClientOptions;

// ============================================================================
// ClientRegistry
// ============================================================================

/// Owns one client per socket path.
///
/// # Example
///
/// ```no_run
/// use gui_bridge::ClientRegistry;
///
/// # async fn example() -> gui_bridge::Result<()> {
/// let registry = ClientRegistry::new();
/// let client = registry.default_client();
/// client.ping().await?;
///
/// // Test teardown
/// registry.reset().await;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientRegistry {
    /// Template for clients the registry creates.
    options: ClientOptions,
    /// Clients by socket path.
    clients: RwLock<FxHashMap<PathBuf, Client>>,
}

// ============================================================================
// ClientRegistry - Constructor
// ============================================================================

impl ClientRegistry {
    /// Creates an empty registry using default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose clients inherit `options`.
    ///
    /// `options.socket_path` is the path [`default_client`](Self::default_client)
    /// targets.
    #[must_use]
    pub fn with_options(options: ClientOptions) -> Self {
        Self {
            options,
            clients: RwLock::new(FxHashMap::default()),
        }
    }
}

// ============================================================================
// ClientRegistry - Public API
// ============================================================================

impl ClientRegistry {
    /// Returns the client for `path`, creating it on first use.
    ///
    /// Creation does not connect.
    pub fn get_or_create(&self, path: impl AsRef<Path>) -> Client {
        let path = path.as_ref();

        if let Some(client) = self.clients.read().get(path) {
            return client.clone();
        }

        let mut clients = self.clients.write();
        clients
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                debug!(path = %path.display(), "Creating client");
                Client::new(self.options.clone().with_socket_path(path))
            })
            .clone()
    }

    /// Returns the client for the configured default socket path.
    pub fn default_client(&self) -> Client {
        self.get_or_create(&self.options.socket_path)
    }

    /// Returns the client for `path`, if one exists.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Client> {
        self.clients.read().get(path.as_ref()).cloned()
    }

    /// Returns the number of clients.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    /// Returns `true` if there are no clients.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}

// ============================================================================
// ClientRegistry - Lifecycle
// ============================================================================

impl ClientRegistry {
    /// Disconnects and forgets the client for `path`.
    ///
    /// Returns `true` if a client was removed.
    pub async fn remove(&self, path: impl AsRef<Path>) -> bool {
        let removed = self.clients.write().remove(path.as_ref());

        match removed {
            Some(client) => {
                client.disconnect().await;
                debug!(path = %path.as_ref().display(), "Client removed");
                true
            }
            None => false,
        }
    }

    /// Disconnects and forgets every client.
    pub async fn reset(&self) {
        let clients: Vec<Client> = {
            let mut map = self.clients.write();
            map.drain().map(|(_, client)| client).collect()
        };

        let count = clients.len();
        join_all(clients.iter().map(Client::disconnect)).await;

        info!(count, "Client registry reset");
    }
}

// ============================================================================
// Tests
// ============================================================================
