//! Page fetcher: one changes query per call

use anyhow::Result;
use log::{debug, warn};

use crate::models::{EventRecord, SyncCursor};

use super::source::{ChangesPage, EventSource};

/// Events of one page plus the cursor to persist once they are processed
#[derive(Debug)]
pub struct FetchedPage {
    pub events: Vec<EventRecord>,
    /// None when the source returned neither a page nor a sync token
    pub next_cursor: Option<SyncCursor>,
}

/// Fetch the page following `cursor`.
///
/// Never writes the cursor itself; the caller persists `next_cursor` after
/// the page's events are fully handled.
pub fn fetch_page(
    source: &dyn EventSource,
    calendar_id: &str,
    cursor: &SyncCursor,
) -> Result<FetchedPage> {
    let page = source.list_changes(calendar_id, cursor)?;
    let next_cursor = next_cursor(&page);

    debug!(
        "Fetched {} events for {} at {} cursor (next: {})",
        page.events.len(),
        calendar_id,
        cursor.kind(),
        next_cursor.as_ref().map_or("none", SyncCursor::kind)
    );

    Ok(FetchedPage {
        events: page.events,
        next_cursor,
    })
}

/// Derive the cursor update from a page's continuation tokens
fn next_cursor(page: &ChangesPage) -> Option<SyncCursor> {
    let page_token = page.next_page_token.as_deref().filter(|t| !t.is_empty());
    let sync_token = page.next_sync_token.as_deref().filter(|t| !t.is_empty());

    match (page_token, sync_token) {
        (Some(page_token), Some(_)) => {
            warn!("Source returned both page and sync tokens; continuing to page");
            Some(SyncCursor::Page(page_token.to_string()))
        }
        (Some(page_token), None) => Some(SyncCursor::Page(page_token.to_string())),
        (None, Some(sync_token)) => Some(SyncCursor::Sync(sync_token.to_string())),
        (None, None) => None,
    }
}
