//! Calendar event model as seen by the sync engine

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{TimeParseError, TimeWindow};

/// Unique identifier for a calendar event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attendee's reply to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    NeedsAction,
    Declined,
    Tentative,
    Accepted,
    #[serde(other)]
    Unknown,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::NeedsAction => "needsAction",
            ResponseStatus::Declined => "declined",
            ResponseStatus::Tentative => "tentative",
            ResponseStatus::Accepted => "accepted",
            ResponseStatus::Unknown => "unknown",
        }
    }
}

/// One attendee entry on an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Provider profile ID, if any
    pub id: Option<String>,
    pub email: String,
    pub response_status: ResponseStatus,
}

impl Attendee {
    pub fn new(email: impl Into<String>, response_status: ResponseStatus) -> Self {
        Self {
            id: None,
            email: email.into(),
            response_status,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Start or end of an event as delivered by the event source
///
/// Timed events carry `date_time`; all-day events carry only `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn date_time(value: impl Into<String>) -> Self {
        Self {
            date_time: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self {
            date: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn in_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    /// True when no explicit date-time is present
    pub fn is_date_only(&self) -> bool {
        self.date_time.as_deref().is_none_or(|v| v.trim().is_empty())
    }
}

/// A changed or listed calendar event
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    pub summary: String,
    pub attendees: Vec<Attendee>,
    /// Creation time as delivered (RFC 3339); absent on cancelled events in
    /// incremental listings. Parsed only for events that may be declined.
    pub created: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

impl EventRecord {
    /// Create a new event builder
    pub fn builder(id: EventId) -> EventRecordBuilder {
        EventRecordBuilder::new(id)
    }

    /// All-day events lack an explicit date-time on either end
    pub fn is_all_day(&self) -> bool {
        self.start.is_date_only() || self.end.is_date_only()
    }

    /// Resolve the absolute window of this event
    pub fn window(&self) -> Result<TimeWindow, TimeParseError> {
        TimeWindow::resolve(&self.start, &self.end)
    }

    /// Parse the creation time
    pub fn created_at(&self) -> Result<DateTime<Utc>, TimeParseError> {
        let raw = self
            .created
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(TimeParseError::MissingCreated)?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| TimeParseError::InvalidCreated(raw.to_string()))
    }

    /// The sole attendee, if there is exactly one
    pub fn sole_attendee(&self) -> Option<&Attendee> {
        match self.attendees.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// Builder for creating EventRecord instances
pub struct EventRecordBuilder {
    id: EventId,
    summary: String,
    attendees: Vec<Attendee>,
    created: Option<String>,
    start: EventTime,
    end: EventTime,
}

impl EventRecordBuilder {
    fn new(id: EventId) -> Self {
        Self {
            id,
            summary: String::new(),
            attendees: Vec::new(),
            created: None,
            start: EventTime::default(),
            end: EventTime::default(),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    pub fn attendees(mut self, attendees: Vec<Attendee>) -> Self {
        self.attendees = attendees;
        self
    }

    pub fn created(self, created: DateTime<Utc>) -> Self {
        self.created_raw(created.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Creation time exactly as the source reported it
    pub fn created_raw(mut self, created: impl Into<String>) -> Self {
        self.created = Some(created.into());
        self
    }

    pub fn start(mut self, start: EventTime) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: EventTime) -> Self {
        self.end = end;
        self
    }

    /// Shorthand for a timed event between two RFC 3339 date-times
    pub fn timed(self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start(EventTime::date_time(start))
            .end(EventTime::date_time(end))
    }

    pub fn build(self) -> EventRecord {
        EventRecord {
            id: self.id,
            summary: self.summary,
            attendees: self.attendees,
            created: self.created,
            start: self.start,
            end: self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status_serde() {
        let status: ResponseStatus = serde_json::from_str(r#""needsAction""#).unwrap();
        assert_eq!(status, ResponseStatus::NeedsAction);
        assert_eq!(serde_json::to_string(&ResponseStatus::Declined).unwrap(), r#""declined""#);

        let unknown: ResponseStatus = serde_json::from_str(r#""delegated""#).unwrap();
        assert_eq!(unknown, ResponseStatus::Unknown);
    }

    #[test]
    fn test_is_all_day() {
        let timed = EventRecord::builder(EventId::new("e1"))
            .timed("2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z")
            .build();
        assert!(!timed.is_all_day());

        let all_day = EventRecord::builder(EventId::new("e2"))
            .start(EventTime::date("2024-01-01"))
            .end(EventTime::date("2024-01-02"))
            .build();
        assert!(all_day.is_all_day());

        let blank = EventRecord::builder(EventId::new("e3"))
            .start(EventTime::date_time(""))
            .end(EventTime::date_time("2024-01-01T11:00:00Z"))
            .build();
        assert!(blank.is_all_day());
    }

    #[test]
    fn test_sole_attendee() {
        let none = EventRecord::builder(EventId::new("e1")).build();
        assert!(none.sole_attendee().is_none());

        let one = EventRecord::builder(EventId::new("e2"))
            .attendee(Attendee::new("me@example.com", ResponseStatus::NeedsAction))
            .build();
        assert_eq!(one.sole_attendee().unwrap().email, "me@example.com");

        let two = EventRecord::builder(EventId::new("e3"))
            .attendee(Attendee::new("a@example.com", ResponseStatus::Accepted))
            .attendee(Attendee::new("b@example.com", ResponseStatus::NeedsAction))
            .build();
        assert!(two.sole_attendee().is_none());
    }

    #[test]
    fn test_created_at() {
        use chrono::TimeZone;

        let event = EventRecord::builder(EventId::new("e1"))
            .created_raw("2024-01-01T09:00:00.000+09:00")
            .build();
        assert_eq!(
            event.created_at().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );

        let garbage = EventRecord::builder(EventId::new("e2"))
            .created_raw("garbage")
            .build();
        assert_eq!(
            garbage.created_at().unwrap_err(),
            TimeParseError::InvalidCreated("garbage".to_string())
        );

        let missing = EventRecord::builder(EventId::new("e3")).build();
        assert_eq!(missing.created_at().unwrap_err(), TimeParseError::MissingCreated);
    }
}
