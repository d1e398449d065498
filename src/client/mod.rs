//! Typed client for the GUI peer.
//!
//! A [`Client`] wraps one socket path. Each method builds a command
//! payload, sends it through the connection manager and reshapes the
//! reply.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Client struct, lifecycle, `send`, `ping` |
//! | `builder` | Validated configuration builder |
//! | `options` | Timeouts, socket path, limits |
//! | `screenshot` | Window capture |
//! | `script` | JavaScript execution and console messages |
//! | `input` | Pointer and keyboard simulation |
//! | `elements` | DOM access and element interaction |
//! | `storage` | `localStorage` access |
//! | `window` | Window management |
//! | `registry` | Clients keyed by socket path |
//!
//! # Example
//!
//! ```ignore
//! let client = Client::builder().socket_path("/tmp/openflow-mcp.sock").build()?;
//!
//! // Script
//! let title: String = client.evaluate("document.title").await?;
//!
//! // Elements
//! client.click_element("#submit", "main").await?;
//! client.type_into_element("input[name=q]", "rust", "main").await?;
//!
//! // Screenshot
//! let shot = client.screenshot(ScreenshotParams::new().with_quality(80)).await?;
//! shot.save("window.jpg").await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod builder;
mod core;
mod elements;
mod input;
mod options;
mod registry;
mod screenshot;
mod script;
mod storage;
mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use core::Client;
pub use elements::ElementPosition;
pub use options::{
    ClientOptions, DEFAULT_COMMAND_TIMEOUT, DEFAULT_SCRIPT_TIMEOUT, DEFAULT_SOCKET_PATH,
    SOCKET_PATH_ENV,
};
pub use registry::ClientRegistry;
pub use screenshot::Screenshot;
pub use script::{ConsoleMessage, ScriptResult};
