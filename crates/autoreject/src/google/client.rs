//! Google Calendar API HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use url::Url;

use super::GoogleAuth;
use super::api::{ApiEvent, EventsResponse};
use super::normalize::{normalize_event, patch_body};
use crate::models::{EventRecord, SyncCursor};
use crate::sync::{ChangesPage, CursorExpiredError, DeclinePatch, EventSource};

/// Calendar API v3 client for one account
pub struct GoogleCalendarClient {
    auth: GoogleAuth,
}

impl GoogleCalendarClient {
    /// Calendar API base URL
    const BASE_URL: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Create a new Calendar client
    pub fn new(auth: GoogleAuth) -> Self {
        Self { auth }
    }

    /// Check if the client has a usable token
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    fn events_url(calendar_id: &str) -> Result<Url> {
        let url = format!(
            "{}/calendars/{}/events",
            Self::BASE_URL,
            urlencoding::encode(calendar_id)
        );
        Url::parse(&url).with_context(|| format!("Invalid events URL {}", url))
    }

    /// URL for one page of a changes listing
    fn changes_url(calendar_id: &str, cursor: &SyncCursor) -> Result<Url> {
        let mut url = Self::events_url(calendar_id)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("singleEvents", "true")
                .append_pair("maxAttendees", "1");
            match cursor {
                SyncCursor::None => {}
                SyncCursor::Page(token) => {
                    query.append_pair("pageToken", token);
                }
                SyncCursor::Sync(token) => {
                    query.append_pair("syncToken", token);
                }
            }
        }
        Ok(url)
    }

    /// URL for one page of a time range listing
    fn range_url(
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<Url> {
        let mut url = Self::events_url(calendar_id)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("singleEvents", "true")
                .append_pair("maxAttendees", "1")
                .append_pair("orderBy", "startTime")
                .append_pair(
                    "timeMin",
                    &time_min.to_rfc3339_opts(SecondsFormat::Secs, true),
                )
                .append_pair(
                    "timeMax",
                    &time_max.to_rfc3339_opts(SecondsFormat::Secs, true),
                );
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    fn patch_url(calendar_id: &str, patch: &DeclinePatch) -> Result<Url> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            Self::BASE_URL,
            urlencoding::encode(calendar_id),
            urlencoding::encode(patch.event_id.as_str())
        );
        let mut url = Url::parse(&url).with_context(|| format!("Invalid event URL {}", url))?;
        url.query_pairs_mut()
            .append_pair("sendUpdates", DeclinePatch::SEND_UPDATES);
        Ok(url)
    }

    /// Fetch and parse one events listing
    ///
    /// # Errors
    /// Returns `CursorExpiredError` when the provider answers 410 Gone
    fn get_events(&self, url: &Url) -> Result<EventsResponse> {
        let access_token = self.auth.get_access_token()?;

        let response = ureq::get(url.as_str())
            .header("Authorization", &format!("Bearer {}", access_token))
            .call();

        match response {
            Ok(mut resp) => {
                let events: EventsResponse = resp
                    .body_mut()
                    .read_json()
                    .context("Failed to parse events response")?;
                Ok(events)
            }
            Err(ureq::Error::StatusCode(410)) => Err(CursorExpiredError.into()),
            Err(e) => Err(anyhow!("Failed to list events: {}", e)),
        }
    }
}

fn normalize_all(items: Vec<ApiEvent>) -> Vec<EventRecord> {
    items.into_iter().map(normalize_event).collect()
}

impl EventSource for GoogleCalendarClient {
    fn list_changes(&self, calendar_id: &str, cursor: &SyncCursor) -> Result<ChangesPage> {
        let url = Self::changes_url(calendar_id, cursor)?;
        let response = self.get_events(&url)?;

        Ok(ChangesPage {
            events: normalize_all(response.items),
            next_page_token: response.next_page_token,
            next_sync_token: response.next_sync_token,
        })
    }

    fn list_in_range(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>> {
        let mut events = Vec::new();
        let mut page_token = None;

        loop {
            let url = Self::range_url(calendar_id, time_min, time_max, page_token.as_deref())?;
            let response = self.get_events(&url)?;
            events.extend(normalize_all(response.items));

            match response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            "Listed {} events in {} between {} and {}",
            events.len(),
            calendar_id,
            time_min,
            time_max
        );
        Ok(events)
    }

    fn patch_event(&self, calendar_id: &str, patch: &DeclinePatch) -> Result<()> {
        let access_token = self.auth.get_access_token()?;
        let url = Self::patch_url(calendar_id, patch)?;

        ureq::patch(url.as_str())
            .header("Authorization", &format!("Bearer {}", access_token))
            .send_json(patch_body(patch))
            .with_context(|| format!("Failed to patch event {}", patch.event_id))?;

        Ok(())
    }
}
