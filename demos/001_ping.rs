//! Connection lifecycle against a running GUI peer.
//!
//! Demonstrates:
//! - Building a client from options
//! - Auto-connect on first command
//! - Status snapshots
//! - Explicit disconnect
//!
//! Usage:
//!   cargo run --example 001_ping
//!   cargo run --example 001_ping -- --socket /tmp/other.sock
//!   cargo run --example 001_ping -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use gui_bridge::{ClientBuilder, Result};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 001: Ping ===\n");

    let client = ClientBuilder::from_options(args.options()).build()?;
    let status = client.status();
    println!("[Setup] Socket: {}", status.socket_path.display());
    println!("        State:  {}\n", status.state);

    // ========================================================================
    // Ping (auto-connects)
    // ========================================================================

    println!("[1] Ping");
    let reply = client.ping().await?;
    println!("    Reply: {reply}");
    println!("    State: {}", client.status().state);
    println!("    ✓ Passed\n");

    // ========================================================================
    // Disconnect
    // ========================================================================

    println!("[2] Disconnect");
    client.disconnect().await;
    println!("    State: {}", client.status().state);
    println!("    ✓ Passed\n");

    println!("=== Done ===");
    Ok(())
}
