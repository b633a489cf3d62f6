//! In-memory stores for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::calendar::ExternalCalendar;
use crate::date_range::DateRange;
use crate::error::{SyncError, SyncResult};
use crate::event::{Event, ExternalEvent};
use crate::record::{Identified, SyncRecord};
use crate::store::{AuthorizationStatus, ExternalStore, LocalStore, Span};

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn external_event_at(id: &str, last_modified: i64) -> ExternalEvent {
    ExternalEvent {
        id: id.to_string(),
        calendar_id: "cal".to_string(),
        title: format!("Event {id}"),
        start: ts(3_600),
        end: ts(7_200),
        all_day: false,
        location: None,
        notes: None,
        last_modified: Some(ts(last_modified)),
        detached: false,
    }
}

pub fn event_at(id: &str, last_modified: i64) -> Event {
    Event::from_external(&external_event_at(id, last_modified))
}

#[derive(Default)]
struct State {
    status: AuthorizationStatus,
    calendars: Vec<ExternalCalendar>,
    events: Vec<ExternalEvent>,
    removed_events: Vec<(String, Span)>,
    failing_updates: Vec<String>,
    clock: i64,
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        ts(1_000_000 + self.clock)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.clock += 1;
        format!("{prefix}-{}", self.clock)
    }
}

pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn with_status(status: AuthorizationStatus) -> Self {
        MemoryStore {
            state: Mutex::new(State {
                status,
                ..Default::default()
            }),
        }
    }

    pub fn authorized() -> Self {
        Self::with_status(AuthorizationStatus::Authorized)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn put_calendar(&self, calendar: ExternalCalendar) {
        self.state().calendars.push(calendar);
    }

    pub fn put_event(&self, event: ExternalEvent) {
        self.state().events.push(event);
    }

    pub fn all_calendars(&self) -> Vec<ExternalCalendar> {
        self.state().calendars.clone()
    }

    pub fn all_events(&self) -> Vec<ExternalEvent> {
        self.state().events.clone()
    }

    pub fn event(&self, id: &str) -> Option<ExternalEvent> {
        self.state().events.iter().find(|e| e.id == id).cloned()
    }

    pub fn removed_events(&self) -> Vec<(String, Span)> {
        self.state().removed_events.clone()
    }

    pub fn fail_updates_for(&self, id: &str) {
        self.state().failing_updates.push(id.to_string());
    }
}

#[async_trait]
impl ExternalStore for MemoryStore {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.state().status
    }

    async fn request_access(&self) -> SyncResult<bool> {
        let mut state = self.state();
        if state.status == AuthorizationStatus::NotDetermined {
            state.status = AuthorizationStatus::Authorized;
        }
        Ok(state.status.is_authorized())
    }

    async fn calendars(&self) -> SyncResult<Vec<ExternalCalendar>> {
        Ok(self.all_calendars())
    }

    async fn events(
        &self,
        range: &DateRange,
        calendars: Option<&[String]>,
    ) -> SyncResult<Vec<ExternalEvent>> {
        Ok(self
            .all_events()
            .into_iter()
            .filter(|e| range.overlaps(e.start, e.end))
            .filter(|e| calendars.is_none_or(|ids| ids.contains(&e.calendar_id)))
            .collect())
    }

    async fn save_calendar(&self, calendar: &ExternalCalendar) -> SyncResult<ExternalCalendar> {
        let mut state = self.state();
        let mut saved = calendar.clone();
        saved.id = state.next_id("calendar");
        state.calendars.push(saved.clone());
        Ok(saved)
    }

    async fn update_calendar(&self, calendar: &ExternalCalendar) -> SyncResult<ExternalCalendar> {
        let mut state = self.state();
        let existing = state
            .calendars
            .iter_mut()
            .find(|c| c.id == calendar.id)
            .ok_or_else(|| SyncError::NotFound(calendar.id.clone()))?;
        *existing = calendar.clone();
        Ok(calendar.clone())
    }

    async fn remove_calendar(&self, calendar_id: &str) -> SyncResult<()> {
        let mut state = self.state();
        let before = state.calendars.len();
        state.calendars.retain(|c| c.id != calendar_id);
        if state.calendars.len() == before {
            return Err(SyncError::NotFound(calendar_id.to_string()));
        }
        Ok(())
    }

    async fn save_event(&self, event: &ExternalEvent) -> SyncResult<ExternalEvent> {
        let mut state = self.state();
        let mut saved = event.clone();
        saved.id = state.next_id("event");
        saved.last_modified = Some(state.tick());
        state.events.push(saved.clone());
        Ok(saved)
    }

    async fn update_event(&self, event: &ExternalEvent, _span: Span) -> SyncResult<ExternalEvent> {
        let mut state = self.state();
        if state.failing_updates.contains(&event.id) {
            return Err(SyncError::Store(format!("update of {} rejected", event.id)));
        }
        let last_modified = state.tick();
        let existing = state
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| SyncError::NotFound(event.id.clone()))?;
        *existing = ExternalEvent {
            last_modified: Some(last_modified),
            ..event.clone()
        };
        Ok(existing.clone())
    }

    async fn remove_event(&self, event_id: &str, span: Span) -> SyncResult<()> {
        let mut state = self.state();
        state.removed_events.push((event_id.to_string(), span));
        let before = state.events.len();
        state.events.retain(|e| e.id != event_id);
        if state.events.len() == before {
            return Err(SyncError::NotFound(event_id.to_string()));
        }
        Ok(())
    }
}

pub struct MemoryLocal<R> {
    records: Mutex<Vec<R>>,
}

impl<R: Clone + Identified> MemoryLocal<R> {
    pub fn new(records: Vec<R>) -> Self {
        MemoryLocal {
            records: Mutex::new(records),
        }
    }

    pub fn snapshot(&self) -> Vec<R> {
        self.records.lock().unwrap().clone()
    }

    pub fn get(&self, identifier: &str) -> Option<R> {
        self.snapshot()
            .into_iter()
            .find(|r| r.identifier() == identifier)
    }
}

#[async_trait]
impl<R> LocalStore<R> for MemoryLocal<R>
where
    R: Clone + Identified + Send + Sync + 'static,
{
    async fn records(&self) -> SyncResult<Vec<R>> {
        Ok(self.snapshot())
    }

    async fn insert(&self, record: R) -> SyncResult<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn update(&self, record: &R) -> SyncResult<()> {
        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|r| r.identifier() == record.identifier())
            .ok_or_else(|| SyncError::NotFound(record.identifier().to_string()))?;
        *existing = record.clone();
        Ok(())
    }

    async fn remove(&self, identifier: &str) -> SyncResult<()> {
        self.records
            .lock()
            .unwrap()
            .retain(|r| r.identifier() != identifier);
        Ok(())
    }
}
