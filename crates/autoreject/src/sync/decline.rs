//! Decline executor

use anyhow::{Context, Result};
use log::info;

use crate::models::{EventId, EventTime, ResponseStatus};

use super::filter::Candidate;
use super::source::EventSource;

/// The rewritten attendee entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclinedAttendee {
    pub id: Option<String>,
    pub email: String,
    pub response_status: ResponseStatus,
    pub comment: String,
}

/// Partial update declining an invitation
///
/// Start and end are echoed back unchanged; only the sole attendee entry
/// is rewritten. Every participant is notified of the decline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclinePatch {
    pub event_id: EventId,
    pub start: EventTime,
    pub end: EventTime,
    pub attendee: DeclinedAttendee,
}

impl DeclinePatch {
    /// Notification scope sent with every decline
    pub const SEND_UPDATES: &'static str = "all";

    pub fn for_candidate(candidate: &Candidate, reply: &str) -> Self {
        Self {
            event_id: candidate.event.id.clone(),
            start: candidate.event.start.clone(),
            end: candidate.event.end.clone(),
            attendee: DeclinedAttendee {
                id: candidate.attendee.id.clone(),
                email: candidate.attendee.email.clone(),
                response_status: ResponseStatus::Declined,
                comment: reply.to_string(),
            },
        }
    }
}

/// Decline the candidate on behalf of its attendee.
///
/// Reapplying to an already declined event is harmless.
pub fn decline(
    source: &dyn EventSource,
    calendar_id: &str,
    candidate: &Candidate,
    reply: &str,
) -> Result<()> {
    let patch = DeclinePatch::for_candidate(candidate, reply);

    source
        .patch_event(calendar_id, &patch)
        .with_context(|| format!("Failed to decline event {}", candidate.event.id))?;

    info!(
        "Declined event {} ({}) for {}",
        candidate.event.id, candidate.event.summary, candidate.attendee.email
    );
    Ok(())
}
