//! Storage trait definitions

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{SyncTarget, settings};

/// Per-user string settings
///
/// Implementations must make each single-key write atomic; no cross-key
/// transactions are required.
pub trait SettingsStore: Send + Sync {
    /// Get the stored value, or None if it was never written
    fn get_setting(&self, user_id: &str, name: &str) -> Result<Option<String>>;

    /// Insert or replace a value
    fn set_string(&self, user_id: &str, name: &str, value: &str) -> Result<()>;

    /// Get a value, falling back to the setting's default
    fn get_string(&self, user_id: &str, name: &str) -> Result<String> {
        Ok(self
            .get_setting(user_id, name)?
            .unwrap_or_else(|| settings::default_value(name).to_string()))
    }
}

/// Persisted sync cursor per target
pub trait CursorStore: Send + Sync {
    /// Get the raw persisted cursor ("" when none)
    fn get_cursor(&self, target: &SyncTarget) -> Result<String>;

    /// Replace the persisted cursor
    fn set_cursor(&self, target: &SyncTarget, raw: &str) -> Result<()>;
}

/// Cursors live in the target user's settings under `synctoken-<calendar>`
impl<S: SettingsStore + ?Sized> CursorStore for S {
    fn get_cursor(&self, target: &SyncTarget) -> Result<String> {
        self.get_string(&target.user_id, &target.sync_token_key())
    }

    fn set_cursor(&self, target: &SyncTarget, raw: &str) -> Result<()> {
        self.set_string(&target.user_id, &target.sync_token_key(), raw)
    }
}

/// Record `now` as the oldest creation time eligible for decline.
///
/// Invites created before registration are never touched.
pub fn register_target(
    store: &dyn SettingsStore,
    target: &SyncTarget,
    now: DateTime<Utc>,
) -> Result<()> {
    store.set_string(
        &target.user_id,
        &target.sync_start_key(),
        &now.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
