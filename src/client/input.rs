//! Pointer and keyboard simulation.

use tracing::debug;

use crate::error::Result;
use crate::protocol::{Command, MouseButton, MouseMoveParams, TypeTextParams};

use super::Client;

// ============================================================================
// Client - Mouse
// ============================================================================

impl Client {
    /// Moves the pointer, optionally clicking at the destination.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn mouse_move(&self, params: MouseMoveParams) -> Result<()> {
        debug!(
            client_id = %self.inner.id,
            x = params.x,
            y = params.y,
            click = params.click.unwrap_or(false),
            "Moving pointer"
        );

        self.send_command(Command::SimulateMouseMovement(params))
            .await?;
        Ok(())
    }

    /// Left-clicks at `(x, y)`.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn click(&self, x: f64, y: f64) -> Result<()> {
        self.click_with(x, y, MouseButton::Left).await
    }

    /// Clicks at `(x, y)` with `button`.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn click_with(&self, x: f64, y: f64, button: MouseButton) -> Result<()> {
        self.mouse_move(MouseMoveParams::new(x, y).with_click(button))
            .await
    }
}

// ============================================================================
// Client - Keyboard
// ============================================================================

impl Client {
    /// Types text into whatever currently has focus.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn type_text(&self, params: TypeTextParams) -> Result<()> {
        debug!(client_id = %self.inner.id, len = params.text.len(), "Typing text");

        self.send_command(Command::SimulateTextInput(params)).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::testing::MockPeer;

    #[tokio::test]
    async fn test_click_is_mouse_move_with_click() {
        let peer = MockPeer::replying(json!(null));
        let client = Client::with_socket_path(peer.path());

        client.click(10.0, 20.5).await.expect("click");

        assert_eq!(peer.commands(), ["SIMULATE_MOUSE_MOVEMENT"]);
        assert_eq!(
            peer.last_payload(),
            json!({"x": 10.0, "y": 20.5, "click": true, "button": "left"})
        );
    }

    #[tokio::test]
    async fn test_relative_move_without_click() {
        let peer = MockPeer::replying(json!(null));
        let client = Client::with_socket_path(peer.path());

        client
            .mouse_move(MouseMoveParams::new(5.0, -3.0).relative())
            .await
            .expect("move");

        assert_eq!(
            peer.last_payload(),
            json!({"x": 5.0, "y": -3.0, "relative": true})
        );
    }

    #[tokio::test]
    async fn test_right_click() {
        let peer = MockPeer::replying(json!(null));
        let client = Client::with_socket_path(peer.path());

        client
            .click_with(1.0, 2.0, MouseButton::Right)
            .await
            .expect("click");

        assert_eq!(peer.last_payload()["button"], json!("right"));
    }

    #[tokio::test]
    async fn test_type_text() {
        let peer = MockPeer::replying(json!(null));
        let client = Client::with_socket_path(peer.path());

        client
            .type_text(TypeTextParams::new("hello\nworld").with_delay_ms(15))
            .await
            .expect("type");

        assert_eq!(peer.commands(), ["SIMULATE_TEXT_INPUT"]);
        assert_eq!(
            peer.last_payload(),
            json!({"text": "hello\nworld", "delay_ms": 15})
        );
    }

    #[tokio::test]
    async fn test_input_failure_propagates() {
        let peer = MockPeer::failing("window not focused");
        let client = Client::with_socket_path(peer.path());

        let err = client.click(0.0, 0.0).await.unwrap_err();
        assert_eq!(err.to_string(), "window not focused");
    }
}
