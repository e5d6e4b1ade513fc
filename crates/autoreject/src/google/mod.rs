//! Google Calendar API integration
//!
//! This module provides:
//! - Stored OAuth2 token refresh
//! - Calendar API v3 client implementing [`crate::sync::EventSource`]
//! - Response normalization to domain models

mod auth;
mod client;
mod normalize;

pub use auth::GoogleAuth;
pub use client::GoogleCalendarClient;
pub use normalize::{normalize_event, patch_body};

/// Calendar API wire types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing events
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EventsResponse {
        #[serde(default)]
        pub items: Vec<ApiEvent>,
        pub next_page_token: Option<String>,
        pub next_sync_token: Option<String>,
    }

    /// A calendar event. Cancelled events in incremental listings carry
    /// little more than `id` and `status`.
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ApiEvent {
        pub id: String,
        pub status: Option<String>,
        pub summary: Option<String>,
        pub created: Option<String>,
        pub start: Option<ApiEventDateTime>,
        pub end: Option<ApiEventDateTime>,
        #[serde(default)]
        pub attendees: Vec<ApiAttendee>,
    }

    /// Start or end of an event
    #[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ApiEventDateTime {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date_time: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub time_zone: Option<String>,
    }

    /// Attendee entry
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ApiAttendee {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub id: Option<String>,
        #[serde(default)]
        pub email: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub response_status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub comment: Option<String>,
    }

    /// Body of a partial event update
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EventPatchBody {
        pub id: String,
        pub start: ApiEventDateTime,
        pub end: ApiEventDateTime,
        pub attendees: Vec<ApiAttendee>,
    }
}
