//! Candidate filter: which changed events are pending invites worth checking

use chrono::{DateTime, Utc};

use crate::models::{Attendee, EventRecord, ResponseStatus, TimeParseError, TimeWindow};

/// A pending single-attendee invite with a resolved, timed window
#[derive(Debug, Clone)]
pub struct Candidate {
    pub event: EventRecord,
    /// The invited user's own attendee entry
    pub attendee: Attendee,
    pub window: TimeWindow,
}

/// Decide whether `event` is eligible for automatic decline.
///
/// Returns `Ok(None)` for events that are simply not candidates. Bad time
/// data on an otherwise eligible event is an error, so the cycle fails
/// visibly instead of silently skipping the invite.
pub fn select_candidate(
    event: &EventRecord,
    oldest_creation: DateTime<Utc>,
) -> Result<Option<Candidate>, TimeParseError> {
    let Some(attendee) = event.sole_attendee() else {
        return Ok(None);
    };
    if attendee.response_status != ResponseStatus::NeedsAction {
        return Ok(None);
    }

    let created = event.created_at()?;
    if created < oldest_creation {
        return Ok(None);
    }

    // All-day invites are never declined
    if event.is_all_day() {
        return Ok(None);
    }

    let window = event.window()?;

    Ok(Some(Candidate {
        attendee: attendee.clone(),
        event: event.clone(),
        window,
    }))
}

/// Filter a page of events down to candidates, preserving source order
pub fn select_candidates(
    events: &[EventRecord],
    oldest_creation: DateTime<Utc>,
) -> Result<Vec<Candidate>, TimeParseError> {
    let mut candidates = Vec::new();
    for event in events {
        if let Some(candidate) = select_candidate(event, oldest_creation)? {
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventId, EventTime};
    use chrono::TimeZone;

    fn cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn me(status: ResponseStatus) -> Attendee {
        Attendee::new("me@example.com", status).with_id("att-1")
    }

    fn invite(id: &str) -> EventRecord {
        EventRecord::builder(EventId::new(id))
            .summary("Sync meeting")
            .attendee(me(ResponseStatus::NeedsAction))
            .created(cutoff())
            .timed("2024-01-01T14:00:00Z", "2024-01-01T15:00:00Z")
            .build()
    }

    #[test]
    fn test_pending_invite_is_candidate() {
        let candidate = select_candidate(&invite("e1"), cutoff()).unwrap().unwrap();
        assert_eq!(candidate.event.id.as_str(), "e1");
        assert_eq!(candidate.attendee.email, "me@example.com");
        assert_eq!(
            candidate.window.start,
            Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_zero_attendees() {
        let mut event = invite("e1");
        event.attendees.clear();
        assert!(select_candidate(&event, cutoff()).unwrap().is_none());
    }

    #[test]
    fn test_rejects_two_attendees() {
        let mut event = invite("e1");
        event
            .attendees
            .push(Attendee::new("other@example.com", ResponseStatus::NeedsAction));
        assert!(select_candidate(&event, cutoff()).unwrap().is_none());
    }

    #[test]
    fn test_rejects_already_answered() {
        for status in [
            ResponseStatus::Accepted,
            ResponseStatus::Declined,
            ResponseStatus::Tentative,
        ] {
            let mut event = invite("e1");
            event.attendees = vec![me(status)];
            assert!(select_candidate(&event, cutoff()).unwrap().is_none());
        }
    }

    #[test]
    fn test_rejects_created_before_cutoff() {
        let mut event = invite("e1");
        event.created = Some((cutoff() - chrono::Duration::seconds(1)).to_rfc3339());
        assert!(select_candidate(&event, cutoff()).unwrap().is_none());
    }

    #[test]
    fn test_created_at_cutoff_is_kept() {
        assert!(select_candidate(&invite("e1"), cutoff()).unwrap().is_some());
    }

    #[test]
    fn test_rejects_all_day() {
        let mut event = invite("e1");
        event.start = EventTime::date("2024-01-01");
        event.end = EventTime::date("2024-01-02");
        assert!(select_candidate(&event, cutoff()).unwrap().is_none());
    }

    #[test]
    fn test_missing_created_is_error() {
        let mut event = invite("e1");
        event.created = None;
        assert_eq!(
            select_candidate(&event, cutoff()).unwrap_err(),
            TimeParseError::MissingCreated
        );
    }

    #[test]
    fn test_malformed_created_is_error() {
        let mut event = invite("e1");
        event.created = Some("garbage".to_string());
        assert_eq!(
            select_candidate(&event, cutoff()).unwrap_err(),
            TimeParseError::InvalidCreated("garbage".to_string())
        );
    }

    #[test]
    fn test_malformed_created_on_non_candidate_is_ignored() {
        let mut group = invite("e1");
        group
            .attendees
            .push(Attendee::new("other@example.com", ResponseStatus::NeedsAction));
        group.created = Some("garbage".to_string());
        assert!(select_candidate(&group, cutoff()).unwrap().is_none());

        let mut answered = invite("e2");
        answered.attendees = vec![me(ResponseStatus::Accepted)];
        answered.created = Some("garbage".to_string());
        assert!(select_candidate(&answered, cutoff()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_time_is_error() {
        let mut event = invite("e1");
        event.start = EventTime::date_time("2024-01-01T14:00:00Z").in_zone("Nowhere/Special");
        assert!(select_candidate(&event, cutoff()).is_err());
    }

    #[test]
    fn test_malformed_time_on_non_candidate_is_ignored() {
        let mut event = invite("e1");
        event.attendees.clear();
        event.start = EventTime::date_time("garbage");
        assert!(select_candidate(&event, cutoff()).unwrap().is_none());
    }

    #[test]
    fn test_select_candidates_preserves_order() {
        let mut declined = invite("e2");
        declined.attendees = vec![me(ResponseStatus::Declined)];
        let events = vec![invite("e3"), declined, invite("e1")];

        let candidates = select_candidates(&events, cutoff()).unwrap();
        let ids: Vec<_> = candidates.iter().map(|c| c.event.id.as_str()).collect();
        assert_eq!(ids, vec!["e3", "e1"]);
    }
}
