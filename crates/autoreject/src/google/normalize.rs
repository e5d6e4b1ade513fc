//! Calendar API response normalization
//!
//! Converts API events to domain models and decline patches to API bodies.

use super::api::{ApiAttendee, ApiEvent, ApiEventDateTime, EventPatchBody};
use crate::models::{Attendee, EventId, EventRecord, EventTime, ResponseStatus};
use crate::sync::DeclinePatch;

/// Normalize an API event to an EventRecord
///
/// Times are kept as given and parsed only when the engine needs them, so
/// bad data on an event that is never considered cannot fail a listing.
pub fn normalize_event(event: ApiEvent) -> EventRecord {
    let attendees = event.attendees.into_iter().map(normalize_attendee).collect();

    let mut builder = EventRecord::builder(EventId::new(event.id))
        .summary(event.summary.unwrap_or_default())
        .attendees(attendees)
        .start(event.start.map(to_event_time).unwrap_or_default())
        .end(event.end.map(to_event_time).unwrap_or_default());
    if let Some(created) = event.created {
        builder = builder.created_raw(created);
    }

    builder.build()
}

/// Build the API body for a decline
pub fn patch_body(patch: &DeclinePatch) -> EventPatchBody {
    EventPatchBody {
        id: patch.event_id.as_str().to_string(),
        start: from_event_time(&patch.start),
        end: from_event_time(&patch.end),
        attendees: vec![ApiAttendee {
            id: patch.attendee.id.clone(),
            email: patch.attendee.email.clone(),
            response_status: Some(patch.attendee.response_status.as_str().to_string()),
            comment: Some(patch.attendee.comment.clone()),
        }],
    }
}

fn normalize_attendee(attendee: ApiAttendee) -> Attendee {
    Attendee {
        id: attendee.id,
        email: attendee.email,
        response_status: parse_response_status(attendee.response_status.as_deref()),
    }
}

fn parse_response_status(value: Option<&str>) -> ResponseStatus {
    match value {
        Some("needsAction") => ResponseStatus::NeedsAction,
        Some("declined") => ResponseStatus::Declined,
        Some("tentative") => ResponseStatus::Tentative,
        Some("accepted") => ResponseStatus::Accepted,
        _ => ResponseStatus::Unknown,
    }
}

fn to_event_time(time: ApiEventDateTime) -> EventTime {
    EventTime {
        date_time: time.date_time,
        date: time.date,
        time_zone: time.time_zone,
    }
}

fn from_event_time(time: &EventTime) -> ApiEventDateTime {
    ApiEventDateTime {
        date_time: time.date_time.clone(),
        date: time.date.clone(),
        time_zone: time.time_zone.clone(),
    }
}
