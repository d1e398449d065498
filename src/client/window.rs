//! Window management.

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::identifiers::WindowLabel;
use crate::protocol::{Command, WindowOperation, WindowParams};

use super::Client;

// ============================================================================
// Client - Window Management
// ============================================================================

impl Client {
    /// Runs one `MANAGE_WINDOW` operation and returns the raw data.
    ///
    /// # Example
    ///
    /// ```ignore
    /// client
    ///     .manage_window(
    ///         WindowParams::new(WindowOperation::SetSize)
    ///             .with_window("settings")
    ///             .with_size(1024, 768),
    ///     )
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn manage_window(&self, params: WindowParams) -> Result<Value> {
        debug!(
            client_id = %self.inner.id,
            operation = ?params.operation,
            window = %params.window_label,
            "Managing window"
        );

        self.send_command(Command::ManageWindow(params)).await
    }

    /// Runs a parameterless operation such as focus or maximize.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn window_operation(
        &self,
        operation: WindowOperation,
        window_label: impl Into<WindowLabel>,
    ) -> Result<()> {
        self.manage_window(WindowParams::new(operation).with_window(window_label))
            .await?;
        Ok(())
    }

    /// Moves a window.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn set_window_position(
        &self,
        window_label: impl Into<WindowLabel>,
        x: i32,
        y: i32,
    ) -> Result<()> {
        let params = WindowParams::new(WindowOperation::SetPosition)
            .with_window(window_label)
            .with_position(x, y);
        self.manage_window(params).await?;
        Ok(())
    }

    /// Resizes a window.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn set_window_size(
        &self,
        window_label: impl Into<WindowLabel>,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let params = WindowParams::new(WindowOperation::SetSize)
            .with_window(window_label)
            .with_size(width, height);
        self.manage_window(params).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
