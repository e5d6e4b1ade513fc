//! Resumption cursor for incremental calendar sync
//!
//! The persisted form is an opaque string. Current writers always tag it:
//! `sync:<token>` for a completed listing and `page:<token>` for a listing
//! interrupted between pages. Older deployments stored the bare sync token,
//! so any other non-empty string is read as a sync token.

use std::fmt;

const SYNC_PREFIX: &str = "sync:";
const PAGE_PREFIX: &str = "page:";

/// Where the next listing should resume from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncCursor {
    /// No usable cursor: list everything from scratch
    #[default]
    None,
    /// Mid-listing continuation token
    Page(String),
    /// Incremental diff token from a completed listing
    Sync(String),
}

impl SyncCursor {
    /// Decode a persisted cursor string
    pub fn decode(raw: &str) -> Self {
        if let Some(token) = raw.strip_prefix(PAGE_PREFIX) {
            return SyncCursor::Page(token.to_string());
        }
        if let Some(token) = raw.strip_prefix(SYNC_PREFIX) {
            return SyncCursor::Sync(token.to_string());
        }
        if raw.is_empty() {
            return SyncCursor::None;
        }
        SyncCursor::Sync(raw.to_string())
    }

    /// Encode for persistence
    pub fn encode(&self) -> String {
        match self {
            SyncCursor::None => String::new(),
            SyncCursor::Page(token) => format!("{PAGE_PREFIX}{token}"),
            SyncCursor::Sync(token) => format!("{SYNC_PREFIX}{token}"),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SyncCursor::None)
    }

    /// Short label for logs and error context
    pub fn kind(&self) -> &'static str {
        match self {
            SyncCursor::None => "none",
            SyncCursor::Page(_) => "page",
            SyncCursor::Sync(_) => "sync",
        }
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncCursor::None => f.write_str("<none>"),
            other => f.write_str(&other.encode()),
        }
    }
}
