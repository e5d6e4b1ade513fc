//! Scripted event source for unit tests

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::models::{EventId, EventRecord, ResponseStatus, SyncCursor};

use super::decline::DeclinePatch;
use super::source::{ChangesPage, CursorExpiredError, EventSource};

enum Scripted {
    Page(ChangesPage),
    Expired,
    Failure(String),
}

/// Replays scripted `list_changes` responses and records every call
pub struct FakeSource {
    script: Mutex<VecDeque<Scripted>>,
    range_events: Vec<EventRecord>,
    fail_patches: bool,
    change_calls: Mutex<Vec<SyncCursor>>,
    range_queries: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    patches: Mutex<Vec<DeclinePatch>>,
    statuses: Mutex<HashMap<EventId, ResponseStatus>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            range_events: Vec::new(),
            fail_patches: false,
            change_calls: Mutex::new(Vec::new()),
            range_queries: Mutex::new(Vec::new()),
            patches: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_range_events(mut self, events: Vec<EventRecord>) -> Self {
        self.range_events = events;
        self
    }

    pub fn failing_patches(mut self) -> Self {
        self.fail_patches = true;
        self
    }

    pub fn then_page(
        self,
        events: Vec<EventRecord>,
        next_page: Option<&str>,
        next_sync: Option<&str>,
    ) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Page(ChangesPage {
            events,
            next_page_token: next_page.map(String::from),
            next_sync_token: next_sync.map(String::from),
        }));
        self
    }

    pub fn then_expired(self) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Expired);
        self
    }

    pub fn then_failure(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.to_string()));
        self
    }

    pub fn change_calls(&self) -> Vec<SyncCursor> {
        self.change_calls.lock().unwrap().clone()
    }

    pub fn range_queries(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.range_queries.lock().unwrap().clone()
    }

    pub fn patches(&self) -> Vec<DeclinePatch> {
        self.patches.lock().unwrap().clone()
    }

    pub fn attendee_status(&self, id: &EventId) -> Option<ResponseStatus> {
        self.statuses.lock().unwrap().get(id).copied()
    }
}

impl EventSource for FakeSource {
    fn list_changes(&self, _calendar_id: &str, cursor: &SyncCursor) -> Result<ChangesPage> {
        self.change_calls.lock().unwrap().push(cursor.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Expired) => Err(CursorExpiredError.into()),
            Some(Scripted::Failure(message)) => Err(anyhow!(message)),
            None => bail!("no scripted page left for cursor {}", cursor),
        }
    }

    fn list_in_range(
        &self,
        _calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>> {
        self.range_queries.lock().unwrap().push((time_min, time_max));
        Ok(self.range_events.clone())
    }

    fn patch_event(&self, _calendar_id: &str, patch: &DeclinePatch) -> Result<()> {
        if self.fail_patches {
            bail!("patch rejected: 403 Forbidden");
        }
        self.patches.lock().unwrap().push(patch.clone());
        self.statuses
            .lock()
            .unwrap()
            .insert(patch.event_id.clone(), patch.attendee.response_status);
        Ok(())
    }
}
