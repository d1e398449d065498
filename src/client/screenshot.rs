//! Screenshot capture methods.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, ScreenshotParams};

use super::Client;

// ============================================================================
// Types
// ============================================================================

/// A captured window image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    /// Base64 image data, without any `data:` URL prefix.
    pub data: String,
    /// Width in pixels, when the peer reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels, when the peer reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Screenshot {
    /// Builds a screenshot from `TAKE_SCREENSHOT` data.
    ///
    /// Accepts either a bare base64 string or `{data, width?, height?}`.
    pub(crate) fn from_data(data: Value) -> Result<Self> {
        let (encoded, width, height) = match &data {
            Value::String(encoded) => (encoded.as_str(), None, None),
            Value::Object(map) => {
                let encoded = map.get("data").and_then(Value::as_str).ok_or_else(|| {
                    Error::protocol("Screenshot response missing data field")
                })?;
                (encoded, dimension(&data, "width"), dimension(&data, "height"))
            }
            other => {
                return Err(Error::protocol(format!(
                    "Unexpected screenshot response: {other}"
                )));
            }
        };

        Ok(Self {
            data: strip_data_url(encoded).to_string(),
            width,
            height,
        })
    }

    /// Decodes the image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Base64`] if the data is not valid base64.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        Ok(Base64Standard.decode(&self.data)?)
    }

    /// Returns `(width, height)`.
    ///
    /// Uses the reported size when both values are present, otherwise
    /// reads the image header.
    ///
    /// # Errors
    ///
    /// - [`Error::Base64`] if the data is not valid base64
    /// - [`Error::Image`] if the header is not a supported image format
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        if let (Some(width), Some(height)) = (self.width, self.height) {
            return Ok((width, height));
        }

        let bytes = self.bytes()?;
        let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        Ok(reader.into_dimensions()?)
    }

    /// Writes the decoded image to `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::Base64`] if the data is not valid base64
    /// - [`Error::Io`] if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.bytes()?;
        tokio::fs::write(path.as_ref(), bytes).await?;
        debug!(path = %path.as_ref().display(), "Screenshot saved");
        Ok(())
    }
}

// ============================================================================
// Client - Screenshot
// ============================================================================

impl Client {
    /// Captures a window.
    ///
    /// Optional parameters are passed to the peer unchanged.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let shot = client
    ///     .screenshot(ScreenshotParams::new().with_quality(80).with_max_width(1280))
    ///     .await?;
    /// shot.save("window.jpg").await?;
    /// ```
    ///
    /// # Errors
    ///
    /// - Any error from [`Client::send`]
    /// - [`Error::Protocol`] if the reply carries no image data
    pub async fn screenshot(&self, params: ScreenshotParams) -> Result<Screenshot> {
        debug!(client_id = %self.inner.id, window = %params.window_label, "Taking screenshot");

        let data = self.send_command(Command::TakeScreenshot(params)).await?;
        Screenshot::from_data(data)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn dimension(data: &Value, key: &str) -> Option<u32> {
    data.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

/// Drops a `data:image/...;base64,` prefix.
fn strip_data_url(encoded: &str) -> &str {
    match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    }
}

// ============================================================================
// Tests
// ============================================================================
