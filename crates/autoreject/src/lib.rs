//! Autoreject crate - Business logic for declining conflicting invitations
//!
//! This crate provides:
//! - Domain models (EventRecord, SyncTarget, SyncCursor, TimeWindow)
//! - Google Calendar API client and token refresh
//! - Settings storage traits with in-memory and SQLite backends
//! - Resumable sync engine that declines invitations overlapping
//!   autoreject blocks

pub mod config;
pub mod google;
pub mod models;
pub mod storage;
pub mod sync;

pub use config::{AutorejectConfig, GoogleCredentials};
pub use google::{GoogleAuth, GoogleCalendarClient};
pub use models::{
    Attendee, EventId, EventRecord, EventTime, ResponseStatus, SyncCursor, SyncTarget,
    TimeParseError, TimeWindow, overlaps, resolve_instant, settings,
};
pub use storage::{
    CursorStore, InMemorySettingsStore, SettingsStore, SqliteSettingsStore, register_target,
};
pub use sync::{
    // Engine
    SyncEngine, SyncStats, ResyncState, reject_conflicting_invites,
    // Pipeline stages
    Candidate, select_candidate, select_candidates, find_conflict, decline,
    BlockingPredicate, TitleMarker, DeclinePatch,
    // Source seam
    ChangesPage, CursorExpiredError, EventSource, is_cursor_expired,
};
