//! JavaScript execution methods.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, ExecuteJsParams};

use super::Client;

// ============================================================================
// Constants
// ============================================================================

/// Reads the console buffer the page's instrumentation maintains.
const CONSOLE_MESSAGES_SCRIPT: &str = "JSON.stringify(window.__consoleMessages || [])";

// ============================================================================
// Types
// ============================================================================

/// Outcome of `EXECUTE_JS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptResult {
    /// Value the script evaluated to.
    #[serde(default)]
    pub result: Value,

    /// JavaScript type name reported by the peer, when present.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One entry of the page console buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// `log`, `warn`, `error`, ...
    pub level: String,
    /// Message text.
    pub message: String,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: f64,
}

// ============================================================================
// Client - Script Execution
// ============================================================================

impl Client {
    /// Runs JavaScript in a window and returns the raw result.
    ///
    /// `params.timeout_ms` is both the peer-side execution limit and the
    /// request timeout. When unset, the configured script timeout is sent.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let out = client
    ///     .execute_js(ExecuteJsParams::new("1 + 1").with_window("settings"))
    ///     .await?;
    /// assert_eq!(out.result, 2);
    /// ```
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn execute_js(&self, params: ExecuteJsParams) -> Result<ScriptResult> {
        let timeout_ms = params
            .timeout_ms
            .unwrap_or_else(|| self.inner.options.script_timeout.as_millis() as u64);
        let params = params.with_timeout_ms(timeout_ms);

        debug!(
            client_id = %self.inner.id,
            window = %params.window_label,
            code_len = params.code.len(),
            timeout_ms,
            "Executing script"
        );

        let timeout = Duration::from_millis(timeout_ms);
        let data = self.send(Command::ExecuteJs(params), timeout).await?;

        Ok(script_result(data))
    }

    /// Runs JavaScript in the main window with the default script timeout
    /// and deserializes its result.
    ///
    /// # Errors
    ///
    /// - Any error from [`execute_js`](Self::execute_js)
    /// - [`Error::Protocol`] if the result does not deserialize into `T`
    pub async fn evaluate<T: DeserializeOwned>(&self, code: &str) -> Result<T> {
        self.evaluate_with(ExecuteJsParams::new(code)).await
    }

    /// Like [`evaluate`](Self::evaluate) with explicit window and timeout.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    pub async fn evaluate_with<T: DeserializeOwned>(&self, params: ExecuteJsParams) -> Result<T> {
        let output = self.execute_js(params).await?;
        decode_result(output.result)
    }

    /// Returns the page console messages captured by the peer.
    ///
    /// Best effort: returns an empty list on any failure, including a page
    /// that was never instrumented.
    pub async fn get_console_messages(&self) -> Vec<ConsoleMessage> {
        match self.evaluate::<Vec<ConsoleMessage>>(CONSOLE_MESSAGES_SCRIPT).await {
            Ok(messages) => messages,
            Err(e) => {
                debug!(client_id = %self.inner.id, error = %e, "Console messages unavailable");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Reshapes `EXECUTE_JS` data into a [`ScriptResult`].
///
/// A peer that returns the bare value instead of `{result, type}` is
/// tolerated.
fn script_result(data: Value) -> ScriptResult {
    match data {
        Value::Object(mut map) if map.contains_key("result") => ScriptResult {
            result: map.remove("result").unwrap_or(Value::Null),
            kind: map
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        other => ScriptResult {
            result: other,
            kind: None,
        },
    }
}

/// Deserializes a script result, accepting JSON that arrived stringified.
fn decode_result<T: DeserializeOwned>(result: Value) -> Result<T> {
    let direct_error = match serde_json::from_value::<T>(result.clone()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Value::String(text) = &result {
        if let Ok(value) = serde_json::from_str::<T>(text) {
            return Ok(value);
        }
    }

    Err(Error::protocol(format!(
        "Unexpected script result: {direct_error}"
    )))
}

// ============================================================================
// Tests
// ============================================================================
