//! Unix socket transport layer.
//!
//! This module handles communication between the client (Rust) and the
//! GUI peer through a local Unix domain socket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐                          ┌─────────────────┐
//! │  Client (Rust)      │                          │  GUI peer       │
//! │                     │     Unix socket          │                 │
//! │  ConnectionManager  │◄────────────────────────►│  Socket         │
//! │  → Connection       │   NDJSON, FIFO replies   │  listener       │
//! │                     │                          │                 │
//! └─────────────────────┘                          └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `ConnectionManager::connect` - Open the socket (single-flight)
//! 2. `Connection` - Send commands, match responses in order
//! 3. Peer close or socket error - Pending requests fail, state updates
//! 4. `ConnectionManager::disconnect` - Close and drain on request
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Socket connection and event loop |
//! | `manager` | Connect/disconnect lifecycle |
//! | `state` | Connection state and status snapshot |

// ============================================================================
// Submodules
// ============================================================================

/// Socket connection and event loop.
pub mod connection;

/// Connection lifecycle management.
pub mod manager;

/// Connection state machine types.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{CloseReason, Connection};
pub use manager::ConnectionManager;
pub use state::{ConnectionState, ConnectionStatus};
