//! Event source abstraction consumed by the sync engine

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{EventRecord, SyncCursor};

use super::decline::DeclinePatch;

/// Error indicating the sync or page token is no longer accepted
///
/// Event sources must return this (wrapped in `anyhow::Error`) so that it
/// can be told apart from transient I/O failures.
#[derive(Debug, thiserror::Error)]
#[error("Sync cursor expired or invalid")]
pub struct CursorExpiredError;

/// Check whether an error chain carries a [`CursorExpiredError`]
pub fn is_cursor_expired(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<CursorExpiredError>())
}

/// One page of a changes listing
#[derive(Debug, Clone, Default)]
pub struct ChangesPage {
    pub events: Vec<EventRecord>,
    /// Set while more pages remain
    pub next_page_token: Option<String>,
    /// Set on the final page of a listing
    pub next_sync_token: Option<String>,
}

/// A calendar backend the engine can list and patch
pub trait EventSource: Send + Sync {
    /// List one page of events changed since `cursor`.
    ///
    /// `SyncCursor::None` lists every current event.
    fn list_changes(&self, calendar_id: &str, cursor: &SyncCursor) -> Result<ChangesPage>;

    /// List all events between `time_min` and `time_max`, ordered by start
    fn list_in_range(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>>;

    /// Apply a partial update declining an invitation
    fn patch_event(&self, calendar_id: &str, patch: &DeclinePatch) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_is_cursor_expired_direct() {
        let err: anyhow::Error = CursorExpiredError.into();
        assert!(is_cursor_expired(&err));
    }

    #[test]
    fn test_is_cursor_expired_with_context() {
        let err = Err::<(), _>(CursorExpiredError)
            .context("listing primary")
            .unwrap_err();
        assert!(is_cursor_expired(&err));
    }

    #[test]
    fn test_other_errors_not_expired() {
        let err = anyhow::anyhow!("HTTP 503");
        assert!(!is_cursor_expired(&err));
    }
}
