//! DOM access and element interaction.
//!
//! `click_element` is a two-step composite: resolve the bounding box, then
//! click its centre. The element may move between the two steps.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::WindowLabel;
use crate::protocol::{Command, ElementPositionParams, SendTextParams};

use super::Client;

// ============================================================================
// Types
// ============================================================================

/// Bounding box of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementPosition {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ElementPosition {
    /// Returns the geometric centre.
    #[inline]
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Reads `x`, `y`, `width` and `height` from response data.
    fn from_data(data: &Value) -> Result<Self> {
        let field = |key: &str| {
            data.get(key).and_then(Value::as_f64).ok_or_else(|| {
                Error::protocol(format!("Element position missing numeric field '{key}'"))
            })
        };

        Ok(Self {
            x: field("x")?,
            y: field("y")?,
            width: field("width")?,
            height: field("height")?,
        })
    }
}

// ============================================================================
// Client - DOM
// ============================================================================

impl Client {
    /// Returns the serialized DOM of a window.
    ///
    /// # Errors
    ///
    /// - Any error from [`Client::send`]
    /// - [`Error::Protocol`] if the reply holds no HTML
    pub async fn get_dom(&self, window_label: impl Into<WindowLabel>) -> Result<String> {
        let window_label = window_label.into();
        debug!(client_id = %self.inner.id, window = %window_label, "Getting DOM");

        let data = self
            .send_command(Command::GetDom { window_label })
            .await?;

        match data {
            Value::String(html) => Ok(html),
            other => other
                .get("dom")
                .or_else(|| other.get("html"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::protocol("DOM response holds no HTML")),
        }
    }
}

// ============================================================================
// Client - Elements
// ============================================================================

impl Client {
    /// Resolves an element's bounding box.
    ///
    /// # Errors
    ///
    /// - Any error from [`Client::send`], including the peer's
    ///   "element not found"
    /// - [`Error::Protocol`] if a coordinate is missing from the reply
    pub async fn get_element_position(
        &self,
        params: ElementPositionParams,
    ) -> Result<ElementPosition> {
        debug!(
            client_id = %self.inner.id,
            selector = %params.selector_value,
            should_click = params.should_click,
            "Getting element position"
        );

        let data = self
            .send_command(Command::GetElementPosition(params))
            .await?;
        ElementPosition::from_data(&data)
    }

    /// Clicks the centre of the element matching a CSS selector.
    ///
    /// Returns the bounding box that was clicked.
    ///
    /// # Errors
    ///
    /// Any error from either step.
    pub async fn click_element(
        &self,
        selector: &str,
        window_label: impl Into<WindowLabel>,
    ) -> Result<ElementPosition> {
        let params = ElementPositionParams::css(selector)
            .with_window(window_label)
            .with_click();
        let position = self.get_element_position(params).await?;

        let (x, y) = position.center();
        self.click(x, y).await?;

        Ok(position)
    }

    /// Types text into a specific element.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn send_text_to_element(&self, params: SendTextParams) -> Result<()> {
        debug!(
            client_id = %self.inner.id,
            selector = %params.selector_value,
            len = params.text.len(),
            "Sending text to element"
        );

        self.send_command(Command::SendTextToElement(params))
            .await?;
        Ok(())
    }

    /// Types text into the element matching a CSS selector.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn type_into_element(
        &self,
        selector: &str,
        text: &str,
        window_label: impl Into<WindowLabel>,
    ) -> Result<()> {
        self.send_text_to_element(SendTextParams::css(selector, text).with_window(window_label))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
