//! Sync cycle: cursor management, resync on expiry, and per-page processing

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::Arc;

use crate::models::{SyncCursor, SyncTarget, settings};
use crate::storage::{CursorStore, SettingsStore, register_target};

use super::conflict::{BlockingPredicate, TitleMarker, find_conflict};
use super::decline::decline;
use super::fetcher::fetch_page;
use super::filter::select_candidates;
use super::source::{EventSource, is_cursor_expired};

/// Where a target's listing stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncState {
    /// No usable cursor; the next fetch lists everything
    Empty,
    /// Pages are being consumed
    Listing,
    /// A sync token has been persisted
    Settled,
}

impl ResyncState {
    fn from_cursor(cursor: &SyncCursor) -> Self {
        match cursor {
            SyncCursor::None => ResyncState::Empty,
            SyncCursor::Page(_) => ResyncState::Listing,
            SyncCursor::Sync(_) => ResyncState::Settled,
        }
    }
}

/// Statistics from a sync cycle
#[derive(Debug, Clone)]
pub struct SyncStats {
    /// Number of change pages fetched
    pub pages_fetched: usize,
    /// Number of changed events seen across all pages
    pub events_seen: usize,
    /// Number of pending invites checked for conflicts
    pub candidates: usize,
    /// Number of invites declined
    pub declined: usize,
    /// Whether an expired cursor forced a full listing
    pub resynced: bool,
    /// State after the last page
    pub final_state: ResyncState,
    /// Duration of the cycle
    pub duration_ms: u64,
}

impl Default for SyncStats {
    fn default() -> Self {
        Self {
            pages_fetched: 0,
            events_seen: 0,
            candidates: 0,
            declined: 0,
            resynced: false,
            final_state: ResyncState::Empty,
            duration_ms: 0,
        }
    }
}

/// What to decline and how to reply, resolved once per cycle
pub struct DeclineRules<'a> {
    pub predicate: &'a dyn BlockingPredicate,
    pub reply: &'a str,
    pub oldest_creation: DateTime<Utc>,
}

/// Settings a cycle reads before it starts
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub marker: TitleMarker,
    pub reply: String,
    pub oldest_creation: DateTime<Utc>,
}

impl CycleSettings {
    /// Read the target's current settings
    pub fn load(store: &dyn SettingsStore, target: &SyncTarget) -> Result<Self> {
        let name = store.get_string(&target.user_id, settings::AUTOREJECT_NAME)?;
        let reply = store.get_string(&target.user_id, settings::AUTOREJECT_REPLY)?;

        let start_key = target.sync_start_key();
        let sync_start = store.get_string(&target.user_id, &start_key)?;
        if sync_start.is_empty() {
            bail!("Sync target {} is not registered ({} is unset)", target, start_key);
        }
        let oldest_creation = DateTime::parse_from_rfc3339(&sync_start)
            .with_context(|| format!("Invalid {} for {}: '{}'", start_key, target, sync_start))?
            .with_timezone(&Utc);

        Ok(Self {
            marker: TitleMarker::new(&name),
            reply,
            oldest_creation,
        })
    }
}

/// Run one sync cycle for `target`, declining invites that conflict with
/// blocking events.
///
/// Pages are processed strictly in order and the cursor is persisted only
/// after every candidate on a page has been handled, so a failed cycle
/// resumes at the page it failed on. An expired cursor restarts the
/// listing from scratch once per cycle.
pub fn reject_conflicting_invites(
    source: &dyn EventSource,
    cursors: &dyn CursorStore,
    target: &SyncTarget,
    rules: &DeclineRules<'_>,
) -> Result<SyncStats> {
    let start = std::time::Instant::now();
    let mut stats = SyncStats::default();
    let calendar_id = target.calendar_id.as_str();

    let raw = cursors
        .get_cursor(target)
        .with_context(|| format!("Failed to read cursor for {}", target))?;
    let mut cursor = SyncCursor::decode(&raw);
    let mut state = ResyncState::from_cursor(&cursor);
    let mut restarted = false;

    loop {
        let page = match fetch_page(source, calendar_id, &cursor) {
            Ok(page) => page,
            Err(e) if is_cursor_expired(&e) && !restarted => {
                warn!(
                    "Cursor for {} expired at {} cursor, restarting full sync",
                    target,
                    cursor.kind()
                );
                cursors
                    .set_cursor(target, "")
                    .with_context(|| format!("Failed to clear cursor for {}", target))?;
                cursor = SyncCursor::None;
                transition(target, &mut state, ResyncState::Empty);
                restarted = true;
                stats.resynced = true;
                continue;
            }
            Err(e) => {
                return Err(e.context(format!(
                    "Failed to list changes for {} at {} cursor",
                    target,
                    cursor.kind()
                )));
            }
        };

        transition(target, &mut state, ResyncState::Listing);
        stats.pages_fetched += 1;
        stats.events_seen += page.events.len();

        let candidates = select_candidates(&page.events, rules.oldest_creation)
            .with_context(|| {
                format!("Invalid event data for {} at {} cursor", target, cursor.kind())
            })?;
        stats.candidates += candidates.len();

        for candidate in &candidates {
            let blocker = find_conflict(source, calendar_id, candidate, rules.predicate)
                .with_context(|| format!("Conflict check failed for {}", target))?;
            let Some(blocker) = blocker else {
                continue;
            };

            debug!("Declining {} because of {}", candidate.event.id, blocker.id);
            decline(source, calendar_id, candidate, rules.reply)
                .with_context(|| format!("Decline failed for {} at {} cursor", target, cursor.kind()))?;
            stats.declined += 1;
        }

        let Some(next) = page.next_cursor else {
            warn!("Source gave no continuation for {}, leaving cursor unchanged", target);
            break;
        };

        cursors
            .set_cursor(target, &next.encode())
            .with_context(|| format!("Failed to persist cursor for {}", target))?;
        cursor = next;

        if let SyncCursor::Sync(_) = cursor {
            transition(target, &mut state, ResyncState::Settled);
            break;
        }
    }

    stats.final_state = state;
    stats.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Synced {}: {} pages, {} events, {} candidates, {} declined in {}ms",
        target,
        stats.pages_fetched,
        stats.events_seen,
        stats.candidates,
        stats.declined,
        stats.duration_ms
    );

    Ok(stats)
}

fn transition(target: &SyncTarget, state: &mut ResyncState, next: ResyncState) {
    if *state != next {
        debug!("{}: {:?} -> {:?}", target, state, next);
        *state = next;
    }
}

/// Runs sync cycles against one event source and its stores
///
/// Settings are re-read on every cycle, so configuration changes take
/// effect on the next run.
pub struct SyncEngine {
    source: Arc<dyn EventSource>,
    settings: Arc<dyn SettingsStore>,
    cursors: Arc<dyn CursorStore>,
}

impl SyncEngine {
    /// Create an engine whose cursors live alongside the settings
    pub fn new<S: SettingsStore + 'static>(source: Arc<dyn EventSource>, store: Arc<S>) -> Self {
        Self {
            source,
            settings: store.clone(),
            cursors: store,
        }
    }

    /// Create an engine with separate settings and cursor stores
    pub fn with_stores(
        source: Arc<dyn EventSource>,
        settings: Arc<dyn SettingsStore>,
        cursors: Arc<dyn CursorStore>,
    ) -> Self {
        Self {
            source,
            settings,
            cursors,
        }
    }

    /// Register `target` if it has no creation cutoff yet.
    ///
    /// Returns true if the target was newly registered.
    pub fn ensure_registered(&self, target: &SyncTarget, now: DateTime<Utc>) -> Result<bool> {
        let existing = self
            .settings
            .get_setting(&target.user_id, &target.sync_start_key())?;
        if existing.is_some_and(|v| !v.is_empty()) {
            return Ok(false);
        }

        register_target(self.settings.as_ref(), target, now)?;
        info!("Registered {} with cutoff {}", target, now.to_rfc3339());
        Ok(true)
    }

    /// Run one full sync cycle for `target`
    pub fn run_sync_cycle(&self, target: &SyncTarget) -> Result<SyncStats> {
        let cycle = CycleSettings::load(self.settings.as_ref(), target)
            .with_context(|| format!("Failed to load settings for {}", target))?;

        if cycle.marker.is_empty() {
            warn!("Blocking marker for {} is empty; nothing will be declined", target);
        }

        let rules = DeclineRules {
            predicate: &cycle.marker,
            reply: &cycle.reply,
            oldest_creation: cycle.oldest_creation,
        };

        reject_conflicting_invites(self.source.as_ref(), self.cursors.as_ref(), target, &rules)
    }

    /// Run one cycle for each target concurrently.
    ///
    /// Targets share nothing but the stores, so one failing target does not
    /// affect the others.
    pub fn sync_all(&self, targets: &[SyncTarget]) -> Vec<(SyncTarget, Result<SyncStats>)> {
        targets
            .par_iter()
            .map(|target| (target.clone(), self.run_sync_cycle(target)))
            .collect()
    }
}
