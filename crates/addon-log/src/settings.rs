//! Settings store seam
//!
//! The logger only ever reads a single boolean key from the store, but the
//! trait is a general async key/value read so the extension's own settings
//! backend can be plugged in directly.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;

/// Valid ASCII characters for setting keys
pub const SETTING_KEY_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-";

/// Maximum length of a setting key
pub const SETTING_KEY_MAX_LEN: usize = 120;

/// Validates that a setting key only uses allowed characters and is within length limits
pub fn validate_setting_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::InvalidKey("key must not be empty".to_string()));
    }

    if key.len() > SETTING_KEY_MAX_LEN {
        return Err(Error::InvalidKey(format!(
            "key exceeds maximum length of {SETTING_KEY_MAX_LEN} characters"
        )));
    }

    if !key.chars().all(|c| SETTING_KEY_ALPHABET.contains(c)) {
        return Err(Error::InvalidKey(format!(
            "key '{key}' contains invalid characters. Only ASCII letters, numbers, underscore, and hyphen are allowed"
        )));
    }

    Ok(())
}

/// Persisted settings
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SettingsStore: Debug + Send + Sync {
    /// Read the value stored under `key`
    ///
    /// Resolves to `Ok(None)` when nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, Error>;
}

/// In-memory settings store
///
/// Values written with [`MemorySettings::set`] take precedence over the
/// defaults given at construction.
#[derive(Debug, Default)]
pub struct MemorySettings {
    defaults: HashMap<String, serde_json::Value>,
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemorySettings {
    /// Empty store without defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that falls back to `defaults` for keys that were never set
    pub fn with_defaults<I, K>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        Self {
            defaults: defaults.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Store `value` under `key`
    pub async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), Error> {
        validate_setting_key(key)?;
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    /// Remove the stored value for `key`, exposing the default again
    pub async fn remove(&self, key: &str) -> Result<Option<serde_json::Value>, Error> {
        validate_setting_key(key)?;
        Ok(self.values.write().await.remove(key))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, Error> {
        validate_setting_key(key)?;

        let stored = self.values.read().await.get(key).cloned();
        Ok(stored.or_else(|| self.defaults.get(key).cloned()))
    }
}
