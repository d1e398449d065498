//! Type-safe identifier wrappers.
//!
//! | Type | Wraps | Purpose |
//! |------|-------|---------|
//! | [`RequestSeq`] | `u64` | Client-side bookkeeping for one pending request |
//! | [`WindowLabel`] | `String` | Target window in the GUI process |
//!
//! Request sequence numbers never travel on the wire. The peer answers
//! strictly in order, so they exist only for logging and queue removal.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestSeq
// ============================================================================

/// Process-wide counter so sequence numbers stay unique across clients.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Monotonically increasing sequence number of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestSeq(u64);

impl RequestSeq {
    /// Allocates the next sequence number.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// WindowLabel
// ============================================================================

/// Label of a window inside the GUI process.
///
/// Defaults to `"main"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowLabel(String);

impl WindowLabel {
    /// Label of the primary window.
    pub const MAIN: &'static str = "main";

    /// Creates a label.
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the primary window label.
    #[inline]
    #[must_use]
    pub fn main() -> Self {
        Self(Self::MAIN.to_string())
    }

    /// Returns the label as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WindowLabel {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for WindowLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

// ============================================================================
// Tests
// ============================================================================
