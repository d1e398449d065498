//! Request and Response envelopes.
//!
//! Neither envelope carries an identifier. Responses are matched to
//! requests purely by order.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command envelope from client to peer.
///
/// # Format
///
/// ```json
/// {"command": "GET_DOM", "payload": {"window_label": "main"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Upper-snake-case command name.
    pub command: String,

    /// Command payload (always an object on the wire).
    pub payload: Value,
}

impl Request {
    /// Creates a request from a raw command name and payload.
    ///
    /// A `null` payload is sent as `{}`.
    #[must_use]
    pub fn new(command: impl Into<String>, payload: Value) -> Self {
        let payload = match payload {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Self {
            command: command.into(),
            payload,
        }
    }

    /// Creates a request from a typed command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the payload fails to serialize.
    pub fn from_command(command: &Command) -> Result<Self> {
        let value = serde_json::to_value(command)?;
        Ok(serde_json::from_value(value)?)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response envelope from peer to client.
///
/// # Format
///
/// Success:
/// ```json
/// {"success": true, "data": {"value": "pong"}, "error": null}
/// ```
///
/// Error:
/// ```json
/// {"success": false, "data": null, "error": "element not found"}
/// ```
///
/// `success=true` should imply `error=null`, but the peer does not
/// enforce it; a success with an error string is still a success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the peer executed the command.
    pub success: bool,

    /// Result data.
    #[serde(default)]
    pub data: Option<Value>,

    /// Error text when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
}

impl Response {
    /// Creates a success response.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Creates a failure response.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Returns the data, or an application error naming `command`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Application`] if `success` is false.
    pub fn into_result(self, command: &str) -> Result<Value> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(Error::application(command, self.error))
        }
    }

    /// Gets a string field from the data object.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }

    /// Gets a numeric field from the data object.
    #[inline]
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.data.as_ref()?.get(key)?.as_f64()
    }

    /// Gets a boolean field from the data object.
    ///
    /// Returns false if the key is missing or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.data
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::identifiers::WindowLabel;

    #[test]
    fn test_request_from_command() {
        let request = Request::from_command(&Command::GetDom {
            window_label: WindowLabel::main(),
        })
        .expect("convert");

        assert_eq!(request.command, "GET_DOM");
        assert_eq!(request.payload, json!({"window_label": "main"}));
    }

    #[test]
    fn test_request_null_payload_becomes_object() {
        let request = Request::new("PING", Value::Null);
        assert_eq!(request.payload, json!({}));
    }

    #[test]
    fn test_success_response() {
        let response: Response =
            serde_json::from_str(r#"{"success":true,"data":{"value":"pong"},"error":null}"#)
                .expect("parse");
        assert!(response.success);
        assert_eq!(response.get_str("value"), Some("pong"));
    }

    #[test]
    fn test_missing_fields_default() {
        let response: Response = serde_json::from_str(r#"{"success":true}"#).expect("parse");
        assert_eq!(response.data, None);
        assert_eq!(response.error, None);
        assert_eq!(response.into_result("PING").expect("ok"), Value::Null);
    }

    #[test]
    fn test_into_result_error() {
        let response = Response::failure("element not found");
        let err = response.into_result("GET_ELEMENT_POSITION").unwrap_err();
        assert_eq!(err.to_string(), "element not found");
    }

    #[test]
    fn test_into_result_error_without_message() {
        let response: Response =
            serde_json::from_str(r#"{"success":false,"data":null,"error":null}"#).expect("parse");
        let err = response.into_result("MANAGE_WINDOW").unwrap_err();
        assert_eq!(err.to_string(), "MANAGE_WINDOW failed");
    }

    #[test]
    fn test_success_with_error_string_is_tolerated() {
        let response: Response =
            serde_json::from_str(r#"{"success":true,"data":1,"error":"stale"}"#).expect("parse");
        assert_eq!(response.into_result("PING").expect("ok"), json!(1));
    }

    #[test]
    fn test_response_get_helpers() {
        let response = Response::ok(json!({"name": "test", "width": 42.5, "visible": true}));
        assert_eq!(response.get_str("name"), Some("test"));
        assert_eq!(response.get_f64("width"), Some(42.5));
        assert!(response.get_bool("visible"));

        assert_eq!(response.get_str("missing"), None);
        assert_eq!(response.get_f64("missing"), None);
        assert!(!response.get_bool("missing"));
    }
}
