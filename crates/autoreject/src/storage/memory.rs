//! In-memory storage implementation
//!
//! Used for tests and single-shot runs where nothing needs to survive
//! the process.

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;

use super::SettingsStore;

/// In-memory implementation of SettingsStore
///
/// Uses a HashMap keyed by (user, setting name) behind an RwLock.
pub struct InMemorySettingsStore {
    values: RwLock<HashMap<(String, String), String>>,
}

impl InMemorySettingsStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored values across all users
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get_setting(&self, user_id: &str, name: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        Ok(values
            .get(&(user_id.to_string(), name.to_string()))
            .cloned())
    }

    fn set_string(&self, user_id: &str, name: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        values.insert((user_id.to_string(), name.to_string()), value.to_string());
        Ok(())
    }
}
