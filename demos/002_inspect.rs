//! Script execution, DOM access and screenshots.
//!
//! Demonstrates:
//! - Typed script evaluation
//! - Console message retrieval
//! - DOM serialization
//! - Screenshot capture to a file
//!
//! Usage:
//!   cargo run --example 002_inspect
//!   cargo run --example 002_inspect -- --socket /tmp/other.sock --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use anyhow::Context;
use common::Args;
use gui_bridge::{Client, ScreenshotParams, WindowLabel};

// ============================================================================
// Constants
// ============================================================================

const SCREENSHOT_PATH: &str = "./gui-bridge-demo.jpg";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    common::init_logging(args.debug);

    let client = Client::new(args.options());
    println!("=== 002: Inspect ===\n");

    // ========================================================================
    // Script
    // ========================================================================

    println!("[1] evaluate: document.title");
    let title: String = client
        .evaluate("document.title")
        .await
        .context("evaluate document.title")?;
    println!("    Title: {title}");
    println!("    ✓ Passed\n");

    println!("[2] Console messages");
    let messages = client.get_console_messages().await;
    for message in messages.iter().take(5) {
        println!("    [{}] {}", message.level, message.message);
    }
    println!("    {} message(s)", messages.len());
    println!("    ✓ Passed\n");

    // ========================================================================
    // DOM
    // ========================================================================

    println!("[3] DOM of main window");
    let dom = client
        .get_dom(WindowLabel::main())
        .await
        .context("get DOM")?;
    println!("    {} bytes", dom.len());
    println!("    ✓ Passed\n");

    // ========================================================================
    // Screenshot
    // ========================================================================

    println!("[4] Screenshot (quality 80, max width 1280)");
    let shot = client
        .screenshot(ScreenshotParams::new().with_quality(80).with_max_width(1280))
        .await
        .context("take screenshot")?;
    let (width, height) = shot.dimensions()?;
    shot.save(SCREENSHOT_PATH).await?;
    println!("    {width}x{height} saved to {SCREENSHOT_PATH}");
    println!("    ✓ Passed\n");

    client.disconnect().await;
    println!("=== Done ===");
    Ok(())
}
