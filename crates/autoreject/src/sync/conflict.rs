//! Conflict detection against blocking events

use anyhow::{Context, Result};
use log::debug;

use crate::models::EventRecord;

use super::filter::Candidate;
use super::source::EventSource;

/// Fixed margin queried around each candidate.
///
/// The wide query only narrows what is fetched; the exact overlap test on
/// each returned event decides. 25h covers any time zone or DST skew
/// between how the source indexes events and their resolved instants.
pub const CONFLICT_MARGIN_HOURS: i64 = 25;

/// Decides whether an event represents the user's declared unavailability
pub trait BlockingPredicate: Send + Sync {
    fn is_blocking(&self, event: &EventRecord) -> bool;
}

impl<F> BlockingPredicate for F
where
    F: Fn(&EventRecord) -> bool + Send + Sync,
{
    fn is_blocking(&self, event: &EventRecord) -> bool {
        self(event)
    }
}

/// Blocking events carry a title marker and have no attendees
#[derive(Debug, Clone)]
pub struct TitleMarker {
    marker: String,
}

impl TitleMarker {
    /// Matching is case-insensitive and ignores surrounding whitespace
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.trim().to_lowercase(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// An empty marker would match every attendee-less event
    pub fn is_empty(&self) -> bool {
        self.marker.is_empty()
    }
}

impl BlockingPredicate for TitleMarker {
    fn is_blocking(&self, event: &EventRecord) -> bool {
        !self.is_empty()
            && event.attendees.is_empty()
            && event.summary.to_lowercase().contains(&self.marker)
    }
}

/// Find the first blocking event overlapping the candidate
pub fn find_conflict(
    source: &dyn EventSource,
    calendar_id: &str,
    candidate: &Candidate,
    predicate: &dyn BlockingPredicate,
) -> Result<Option<EventRecord>> {
    let range = candidate
        .window
        .padded(chrono::Duration::hours(CONFLICT_MARGIN_HOURS));

    let nearby = source
        .list_in_range(calendar_id, range.start, range.end)
        .with_context(|| {
            format!(
                "Failed to list events around {} ({} to {})",
                candidate.event.id, range.start, range.end
            )
        })?;

    for event in nearby {
        if !predicate.is_blocking(&event) {
            continue;
        }

        let window = event
            .window()
            .with_context(|| format!("Invalid time on blocking event {}", event.id))?;

        if candidate.window.overlaps(&window) {
            debug!(
                "Invite {} conflicts with blocking event {}",
                candidate.event.id, event.id
            );
            return Ok(Some(event));
        }
    }

    Ok(None)
}
