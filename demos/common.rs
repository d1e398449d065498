//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use gui_bridge::ClientOptions;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub socket: Option<PathBuf>,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let socket = args
            .iter()
            .position(|a| a == "--socket")
            .and_then(|i| args.get(i + 1))
            .map(PathBuf::from);

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            socket,
        }
    }

    /// Client options: `--socket`, then `GUI_BRIDGE_SOCKET`, then the default.
    pub fn options(&self) -> ClientOptions {
        let options = ClientOptions::from_env();
        match &self.socket {
            Some(path) => options.with_socket_path(path),
            None => options,
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "gui_bridge=trace"
    } else {
        "gui_bridge=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
