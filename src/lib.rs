//! GUI Bridge - Control-channel client for a GUI process.
//!
//! This library drives a separate GUI process (screenshots, DOM queries,
//! simulated input, JavaScript execution, window management) over a local
//! Unix domain socket.
//!
//! # Architecture
//!
//! The client follows a command/response model:
//!
//! - **Client (Rust)**: Sends commands, awaits one response per command
//! - **Peer (GUI process)**: Executes commands one at a time, answers in order
//!
//! Key design principles:
//!
//! - Each [`Client`] owns at most one socket and one event loop task
//! - Messages are newline-delimited JSON with no request identifiers
//! - Responses are matched to the oldest pending request (FIFO)
//! - Every request resolves exactly once: response, timeout or teardown
//!
//! # Quick Start
//!
//! ```no_run
//! use gui_bridge::{Client, Result, ScreenshotParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .socket_path("/tmp/openflow-mcp.sock")
//!         .build()?;
//!
//!     // Connects on first use
//!     println!("peer says {}", client.ping().await?);
//!
//!     let title: String = client.evaluate("document.title").await?;
//!     println!("title: {title}");
//!
//!     client.click_element("#submit", "main").await?;
//!
//!     let shot = client.screenshot(ScreenshotParams::new()).await?;
//!     shot.save("window.png").await?;
//!
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`] facade, options, builder, registry |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Request sequence numbers and window labels |
//! | [`protocol`] | Wire message types and codec |
//! | [`transport`] | Socket connection and lifecycle |

// ============================================================================
// Modules
// ============================================================================

/// Typed client facade.
///
/// - [`Client`] - Handle to one peer socket
/// - [`ClientBuilder`] - Validated configuration
/// - [`ClientRegistry`] - Clients keyed by socket path
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Identifier newtypes.
pub mod identifiers;

/// Wire protocol message types.
///
/// Command catalogue, envelopes and the newline-delimited JSON codec.
pub mod protocol;

/// Unix socket transport layer.
///
/// Connection event loop and connect/disconnect lifecycle.
pub mod transport;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    Client, ClientBuilder, ClientOptions, ClientRegistry, ConsoleMessage, ElementPosition,
    Screenshot, ScriptResult,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestSeq, WindowLabel};

// Protocol types
pub use protocol::{
    Command, ElementPositionParams, ExecuteJsParams, LocalStorageParams, MouseButton,
    MouseMoveParams, ScreenshotParams, SelectorType, SendTextParams, StorageAction,
    TypeTextParams, WindowOperation, WindowParams,
};

// Transport types
pub use transport::{ConnectionState, ConnectionStatus};
