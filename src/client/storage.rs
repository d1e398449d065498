//! `localStorage` access.
//!
//! Action/field combinations are not validated here; the peer rejects
//! invalid ones and the rejection surfaces as an application error.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, LocalStorageParams, StorageAction};

use super::Client;

// ============================================================================
// Client - Local Storage
// ============================================================================

impl Client {
    /// Runs one `MANAGE_LOCAL_STORAGE` action and returns the raw data.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn local_storage(&self, params: LocalStorageParams) -> Result<Value> {
        debug!(
            client_id = %self.inner.id,
            action = ?params.action,
            key = params.key.as_deref().unwrap_or(""),
            "Managing local storage"
        );

        self.send_command(Command::ManageLocalStorage(params))
            .await
    }

    /// Reads one key. Returns `None` if it is unset.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn local_storage_get(&self, key: &str) -> Result<Option<String>> {
        let data = self.local_storage(LocalStorageParams::get(key)).await?;

        let value = match data {
            Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
            other => other,
        };

        Ok(match value {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        })
    }

    /// Writes one key.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn local_storage_set(&self, key: &str, value: &str) -> Result<()> {
        self.local_storage(LocalStorageParams::set(key, value))
            .await?;
        Ok(())
    }

    /// Removes one key.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn local_storage_remove(&self, key: &str) -> Result<()> {
        self.local_storage(LocalStorageParams::remove(key)).await?;
        Ok(())
    }

    /// Removes every key.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn local_storage_clear(&self) -> Result<()> {
        self.local_storage(LocalStorageParams::new(StorageAction::Clear))
            .await?;
        Ok(())
    }

    /// Lists stored keys.
    ///
    /// # Errors
    ///
    /// - Any error from [`Client::send`]
    /// - [`Error::Protocol`] if the reply is not a list of strings
    pub async fn local_storage_keys(&self) -> Result<Vec<String>> {
        let data = self
            .local_storage(LocalStorageParams::new(StorageAction::Keys))
            .await?;

        let keys = match data {
            Value::Object(mut map) => map.remove("keys").unwrap_or(Value::Null),
            other => other,
        };

        serde_json::from_value(keys)
            .map_err(|e| Error::protocol(format!("Unexpected storage keys: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
