//! Time window resolution and overlap arithmetic

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::EventTime;

/// Error resolving an event's start or end into an absolute instant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),
    #[error("invalid date-time '{value}': {reason}")]
    InvalidDateTime { value: String, reason: String },
    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
    #[error("local time {local} does not exist in {zone}")]
    NonexistentLocalTime { local: NaiveDateTime, zone: String },
    #[error("no datetime or date")]
    MissingDateTime,
    #[error("invalid creation time '{0}'")]
    InvalidCreated(String),
    #[error("missing creation time")]
    MissingCreated,
}

/// An absolute, zone-resolved span of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Resolve both ends of an event
    pub fn resolve(start: &EventTime, end: &EventTime) -> Result<Self, TimeParseError> {
        Ok(Self {
            start: resolve_instant(start, true)?,
            end: resolve_instant(end, false)?,
        })
    }

    /// Widen the window by `margin` on both sides
    pub fn padded(&self, margin: chrono::Duration) -> Self {
        Self {
            start: self.start - margin,
            end: self.end + margin,
        }
    }

    /// Strict overlap test, see [`overlaps`]
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps(self, other)
    }
}

/// Returns true when `a` and `b` share any time.
///
/// Intervals are half-open: back-to-back windows that only touch at a
/// boundary do not overlap.
pub fn overlaps(a: &TimeWindow, b: &TimeWindow) -> bool {
    !(b.start >= a.end || b.end <= a.start)
}

/// Resolve one end of an event into an absolute instant.
///
/// Explicit date-times are honored as given; date-times without an offset
/// and all-day dates are read as wall-clock time in the event's time zone
/// (UTC when none is given). An all-day start resolves to 00:00:00 and an
/// all-day end to 23:59:59 of the stated date.
pub fn resolve_instant(time: &EventTime, is_start: bool) -> Result<DateTime<Utc>, TimeParseError> {
    let zone = parse_zone(time.time_zone.as_deref())?;

    if let Some(value) = non_empty(time.date_time.as_deref()) {
        return parse_date_time(value, zone);
    }

    let value = non_empty(time.date.as_deref()).ok_or(TimeParseError::MissingDateTime)?;
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        TimeParseError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;

    let (h, m, s) = if is_start { (0, 0, 0) } else { (23, 59, 59) };
    let local = date
        .and_hms_opt(h, m, s)
        .ok_or_else(|| TimeParseError::InvalidDate {
            value: value.to_string(),
            reason: format!("could not derive {h:02}:{m:02}:{s:02}"),
        })?;

    localize(zone, local)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_zone(name: Option<&str>) -> Result<Tz, TimeParseError> {
    match non_empty(name) {
        None => Ok(Tz::UTC),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| TimeParseError::UnknownTimeZone(name.to_string())),
    }
}

fn parse_date_time(value: &str, zone: Tz) -> Result<DateTime<Utc>, TimeParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => {
            // Offset-less values are wall-clock time in the event's zone
            let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map_err(
                |_| TimeParseError::InvalidDateTime {
                    value: value.to_string(),
                    reason: rfc_err.to_string(),
                },
            )?;
            localize(zone, naive)
        }
    }
}

fn localize(zone: Tz, local: NaiveDateTime) -> Result<DateTime<Utc>, TimeParseError> {
    zone.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeParseError::NonexistentLocalTime {
            local,
            zone: zone.name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(utc(start), utc(end))
    }

    #[test]
    fn test_touching_windows_do_not_overlap() {
        let blocking = window("2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z");
        let invite = window("2024-01-01T11:00:00Z", "2024-01-01T12:00:00Z");
        assert!(!overlaps(&invite, &blocking));
        assert!(!overlaps(&blocking, &invite));
    }

    #[test]
    fn test_one_minute_overlap() {
        let blocking = window("2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z");
        let invite = window("2024-01-01T10:59:00Z", "2024-01-01T12:00:00Z");
        assert!(overlaps(&invite, &blocking));
        assert!(invite.overlaps(&blocking));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = window("2024-01-01T09:00:00Z", "2024-01-01T17:00:00Z");
        let inner = window("2024-01-01T12:00:00Z", "2024-01-01T13:00:00Z");
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&inner, &outer));
    }

    #[test]
    fn test_disjoint_windows() {
        let a = window("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
        let b = window("2024-01-02T09:00:00Z", "2024-01-02T10:00:00Z");
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn test_padded() {
        let w = window("2024-01-02T10:00:00Z", "2024-01-02T11:00:00Z");
        let padded = w.padded(chrono::Duration::hours(25));
        assert_eq!(padded.start, utc("2024-01-01T09:00:00Z"));
        assert_eq!(padded.end, utc("2024-01-03T12:00:00Z"));
    }

    #[test]
    fn test_resolve_explicit_offset() {
        let t = EventTime::date_time("2024-01-01T09:00:00-05:00");
        assert_eq!(resolve_instant(&t, true).unwrap(), utc("2024-01-01T14:00:00Z"));
    }

    #[test]
    fn test_resolve_offset_wins_over_zone() {
        let t = EventTime::date_time("2024-01-01T14:00:00Z").in_zone("Europe/Berlin");
        assert_eq!(resolve_instant(&t, true).unwrap(), utc("2024-01-01T14:00:00Z"));
    }

    #[test]
    fn test_resolve_wall_clock_in_zone() {
        let t = EventTime::date_time("2024-07-01T09:00:00").in_zone("America/New_York");
        assert_eq!(resolve_instant(&t, true).unwrap(), utc("2024-07-01T13:00:00Z"));
    }

    #[test]
    fn test_resolve_wall_clock_defaults_to_utc() {
        let t = EventTime::date_time("2024-07-01T09:00:00");
        assert_eq!(resolve_instant(&t, false).unwrap(), utc("2024-07-01T09:00:00Z"));
    }

    #[test]
    fn test_resolve_all_day_bounds() {
        let t = EventTime::date("2024-03-05");
        assert_eq!(resolve_instant(&t, true).unwrap(), utc("2024-03-05T00:00:00Z"));
        assert_eq!(resolve_instant(&t, false).unwrap(), utc("2024-03-05T23:59:59Z"));
    }

    #[test]
    fn test_resolve_all_day_in_zone() {
        let t = EventTime::date("2024-01-10").in_zone("Asia/Tokyo");
        assert_eq!(resolve_instant(&t, true).unwrap(), utc("2024-01-09T15:00:00Z"));
    }

    #[test]
    fn test_resolve_missing_both() {
        let t = EventTime::default();
        assert_eq!(resolve_instant(&t, true), Err(TimeParseError::MissingDateTime));
    }

    #[test]
    fn test_resolve_unknown_zone() {
        let t = EventTime::date_time("2024-01-01T09:00:00Z").in_zone("Mars/Olympus_Mons");
        assert!(matches!(
            resolve_instant(&t, true),
            Err(TimeParseError::UnknownTimeZone(_))
        ));
    }

    #[test]
    fn test_resolve_malformed_date_time() {
        let t = EventTime::date_time("next tuesday");
        assert!(matches!(
            resolve_instant(&t, true),
            Err(TimeParseError::InvalidDateTime { .. })
        ));
    }

    #[test]
    fn test_resolve_nonexistent_local_time() {
        // Clocks jump from 02:00 to 03:00 in New York on this date
        let t = EventTime::date_time("2024-03-10T02:30:00").in_zone("America/New_York");
        assert!(matches!(
            resolve_instant(&t, true),
            Err(TimeParseError::NonexistentLocalTime { .. })
        ));
    }

    #[test]
    fn test_resolve_window() {
        let w = TimeWindow::resolve(
            &EventTime::date_time("2024-01-01T14:00:00Z"),
            &EventTime::date_time("2024-01-01T15:00:00Z"),
        )
        .unwrap();
        assert_eq!(w, window("2024-01-01T14:00:00Z", "2024-01-01T15:00:00Z"));
    }
}
