//! Wire protocol message types.
//!
//! This module defines the message format exchanged with the GUI peer.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Client → Peer | Command envelope |
//! | `Response` | Peer → Client | Result envelope |
//!
//! Each message is one UTF-8 JSON object followed by `\n`. Messages carry
//! no identifiers: the peer runs one command at a time and answers in the
//! order commands arrived, so the client matches responses FIFO.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Typed command catalogue and payloads |
//! | `codec` | Line encoding, decoding and buffering |
//! | `request` | Request and Response envelopes |

// ============================================================================
// Submodules
// ============================================================================

/// Newline-delimited JSON codec.
pub mod codec;

/// Command definitions and payload types.
pub mod command;

/// Request and Response envelopes.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::LineBuffer;
pub use command::{
    Command, ElementPositionParams, ExecuteJsParams, LocalStorageParams, MouseButton,
    MouseMoveParams, ScreenshotParams, SelectorType, SendTextParams, StorageAction,
    TypeTextParams, WindowOperation, WindowParams,
};
pub use request::{Request, Response};
