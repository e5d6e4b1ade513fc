//! Sync engine for declining conflicting invitations
//!
//! Provides resumable sync cycles that can be safely retried: cursors are
//! persisted only after a page is fully processed and declines are
//! idempotent.

mod conflict;
mod decline;
mod engine;
mod fetcher;
mod filter;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use conflict::{BlockingPredicate, CONFLICT_MARGIN_HOURS, TitleMarker, find_conflict};
pub use decline::{DeclinePatch, DeclinedAttendee, decline};
pub use engine::{
    CycleSettings, DeclineRules, ResyncState, SyncEngine, SyncStats, reject_conflicting_invites,
};
pub use fetcher::{FetchedPage, fetch_page};
pub use filter::{Candidate, select_candidate, select_candidates};
pub use source::{ChangesPage, CursorExpiredError, EventSource, is_cursor_expired};
