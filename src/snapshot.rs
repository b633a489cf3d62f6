//! JSON-file-backed stores.
//!
//! `SnapshotStore` plays the external calendar store: it holds calendars and
//! raw event occurrences (a recurring series appears once per occurrence).
//! `LocalDatabase` is the application's own copy. Both rewrite their file
//! after every mutation.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use synckit_core::date_range::DateRange;
use synckit_core::error::{SyncError, SyncResult};
use synckit_core::store::{AuthorizationStatus, ExternalStore, LocalStore, Span};
use synckit_core::{Calendar, Event, ExternalCalendar, ExternalEvent, Identified};

async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> SyncResult<T> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

async fn write_json(path: &Path, contents: String) -> SyncResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> SyncResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| SyncError::Store("store state poisoned".into()))
}

// EXTERNAL STORE:

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ExternalSnapshot {
    #[serde(default)]
    pub authorization: AuthorizationStatus,
    #[serde(default)]
    pub calendars: Vec<ExternalCalendar>,
    #[serde(default)]
    pub events: Vec<ExternalEvent>,
}

pub struct SnapshotStore {
    path: PathBuf,
    state: Mutex<ExternalSnapshot>,
}

impl SnapshotStore {
    /// Open the snapshot at `path`. A missing file is an empty store whose
    /// access has not been requested yet.
    pub async fn open(path: &Path) -> SyncResult<Self> {
        let snapshot: ExternalSnapshot = read_json(path).await?;
        tracing::debug!(
            path = %path.display(),
            calendars = snapshot.calendars.len(),
            events = snapshot.events.len(),
            "opened external snapshot"
        );

        Ok(SnapshotStore {
            path: path.to_path_buf(),
            state: Mutex::new(snapshot),
        })
    }

    /// Run `f` against the snapshot and write the result back.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut ExternalSnapshot) -> SyncResult<T>,
    ) -> SyncResult<T> {
        let (value, contents) = {
            let mut state = lock(&self.state)?;
            let value = f(&mut *state)?;
            (value, serde_json::to_string_pretty(&*state)?)
        };
        write_json(&self.path, contents).await?;
        Ok(value)
    }

    fn ensure_writable(calendars: &[ExternalCalendar], calendar_id: &str) -> SyncResult<()> {
        match calendars.iter().find(|c| c.id == calendar_id) {
            Some(c) if !c.allows_modifications => Err(SyncError::Store(format!(
                "Calendar '{}' is read-only",
                c.title
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ExternalStore for SnapshotStore {
    fn authorization_status(&self) -> AuthorizationStatus {
        lock(&self.state)
            .map(|s| s.authorization)
            .unwrap_or(AuthorizationStatus::Restricted)
    }

    /// Access that was never decided is granted; an explicit refusal stays.
    async fn request_access(&self) -> SyncResult<bool> {
        self.mutate(|s| {
            if s.authorization == AuthorizationStatus::NotDetermined {
                s.authorization = AuthorizationStatus::Authorized;
            }
            Ok(s.authorization.is_authorized())
        })
        .await
    }

    async fn calendars(&self) -> SyncResult<Vec<ExternalCalendar>> {
        Ok(lock(&self.state)?.calendars.clone())
    }

    async fn events(
        &self,
        range: &DateRange,
        calendars: Option<&[String]>,
    ) -> SyncResult<Vec<ExternalEvent>> {
        let state = lock(&self.state)?;
        Ok(state
            .events
            .iter()
            .filter(|e| range.overlaps(e.start, e.end))
            .filter(|e| calendars.is_none_or(|ids| ids.contains(&e.calendar_id)))
            .cloned()
            .collect())
    }

    async fn save_calendar(&self, calendar: &ExternalCalendar) -> SyncResult<ExternalCalendar> {
        self.mutate(|s| {
            let saved = ExternalCalendar {
                id: uuid::Uuid::new_v4().to_string(),
                ..calendar.clone()
            };
            s.calendars.push(saved.clone());
            Ok(saved)
        })
        .await
    }

    async fn update_calendar(&self, calendar: &ExternalCalendar) -> SyncResult<ExternalCalendar> {
        self.mutate(|s| {
            let existing = s
                .calendars
                .iter_mut()
                .find(|c| c.id == calendar.id)
                .ok_or_else(|| SyncError::NotFound(calendar.id.clone()))?;
            if !existing.allows_modifications {
                return Err(SyncError::Store(format!(
                    "Calendar '{}' is read-only",
                    existing.title
                )));
            }
            existing.title = calendar.title.clone();
            existing.color = calendar.color.clone();
            Ok(existing.clone())
        })
        .await
    }

    async fn remove_calendar(&self, calendar_id: &str) -> SyncResult<()> {
        self.mutate(|s| {
            let before = s.calendars.len();
            s.calendars.retain(|c| c.id != calendar_id);
            if s.calendars.len() == before {
                return Err(SyncError::NotFound(calendar_id.to_string()));
            }
            s.events.retain(|e| e.calendar_id != calendar_id);
            Ok(())
        })
        .await
    }

    async fn save_event(&self, event: &ExternalEvent) -> SyncResult<ExternalEvent> {
        self.mutate(|s| {
            Self::ensure_writable(&s.calendars, &event.calendar_id)?;
            let saved = ExternalEvent {
                id: uuid::Uuid::new_v4().to_string(),
                last_modified: Some(Utc::now()),
                detached: false,
                ..event.clone()
            };
            s.events.push(saved.clone());
            Ok(saved)
        })
        .await
    }

    /// `ThisEvent` rewrites the occurrence starting at `event.start` (or the
    /// first occurrence if none does) and detaches it from its series.
    /// `FutureEvents` copies the descriptive fields onto every occurrence
    /// starting at or after `event.start`, keeping their own times.
    async fn update_event(&self, event: &ExternalEvent, span: Span) -> SyncResult<ExternalEvent> {
        self.mutate(|s| {
            Self::ensure_writable(&s.calendars, &event.calendar_id)?;
            let now = Some(Utc::now());

            let occurrences: Vec<usize> = s
                .events
                .iter()
                .enumerate()
                .filter(|(_, e)| e.id == event.id)
                .map(|(i, _)| i)
                .collect();
            let Some(&first) = occurrences.first() else {
                return Err(SyncError::NotFound(event.id.clone()));
            };

            match span {
                Span::ThisEvent => {
                    let target = occurrences
                        .iter()
                        .copied()
                        .find(|&i| s.events[i].start == event.start)
                        .unwrap_or(first);
                    let detached = occurrences.len() > 1;
                    s.events[target] = ExternalEvent {
                        last_modified: now,
                        detached,
                        ..event.clone()
                    };
                    Ok(s.events[target].clone())
                }
                Span::FutureEvents => {
                    let mut updated = None;
                    for &i in &occurrences {
                        let occurrence = &mut s.events[i];
                        if occurrence.start < event.start {
                            continue;
                        }
                        occurrence.title = event.title.clone();
                        occurrence.location = event.location.clone();
                        occurrence.notes = event.notes.clone();
                        occurrence.all_day = event.all_day;
                        occurrence.last_modified = now;
                        updated.get_or_insert_with(|| occurrence.clone());
                    }
                    updated.ok_or_else(|| SyncError::NotFound(event.id.clone()))
                }
            }
        })
        .await
    }

    /// `ThisEvent` removes the first occurrence; `FutureEvents` removes the
    /// whole series.
    async fn remove_event(&self, event_id: &str, span: Span) -> SyncResult<()> {
        self.mutate(|s| {
            let position = s
                .events
                .iter()
                .position(|e| e.id == event_id)
                .ok_or_else(|| SyncError::NotFound(event_id.to_string()))?;
            Self::ensure_writable(&s.calendars, &s.events[position].calendar_id)?;

            match span {
                Span::ThisEvent => {
                    s.events.remove(position);
                }
                Span::FutureEvents => s.events.retain(|e| e.id != event_id),
            }
            Ok(())
        })
        .await
    }
}

// LOCAL DATABASE:

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LocalSnapshot {
    #[serde(default)]
    pub calendars: Vec<Calendar>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Selects the table of a [`LocalSnapshot`] holding one record kind.
pub trait Table: Sized {
    fn table(snapshot: &LocalSnapshot) -> &Vec<Self>;
    fn table_mut(snapshot: &mut LocalSnapshot) -> &mut Vec<Self>;
}

impl Table for Calendar {
    fn table(snapshot: &LocalSnapshot) -> &Vec<Self> {
        &snapshot.calendars
    }

    fn table_mut(snapshot: &mut LocalSnapshot) -> &mut Vec<Self> {
        &mut snapshot.calendars
    }
}

impl Table for Event {
    fn table(snapshot: &LocalSnapshot) -> &Vec<Self> {
        &snapshot.events
    }

    fn table_mut(snapshot: &mut LocalSnapshot) -> &mut Vec<Self> {
        &mut snapshot.events
    }
}

pub struct LocalDatabase {
    path: PathBuf,
    state: Mutex<LocalSnapshot>,
}

impl LocalDatabase {
    pub async fn open(path: &Path) -> SyncResult<Self> {
        let snapshot: LocalSnapshot = read_json(path).await?;
        Ok(LocalDatabase {
            path: path.to_path_buf(),
            state: Mutex::new(snapshot),
        })
    }

    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut LocalSnapshot) -> SyncResult<T>,
    ) -> SyncResult<T> {
        let (value, contents) = {
            let mut state = lock(&self.state)?;
            let value = f(&mut *state)?;
            (value, serde_json::to_string_pretty(&*state)?)
        };
        write_json(&self.path, contents).await?;
        Ok(value)
    }
}

#[async_trait]
impl<R> LocalStore<R> for LocalDatabase
where
    R: Table + Identified + Clone + Send + Sync + 'static,
{
    async fn records(&self) -> SyncResult<Vec<R>> {
        Ok(R::table(&*lock(&self.state)?).clone())
    }

    async fn insert(&self, record: R) -> SyncResult<()> {
        self.mutate(|s| {
            R::table_mut(s).push(record);
            Ok(())
        })
        .await
    }

    async fn update(&self, record: &R) -> SyncResult<()> {
        self.mutate(|s| {
            let existing = R::table_mut(s)
                .iter_mut()
                .find(|r| r.identifier() == record.identifier())
                .ok_or_else(|| SyncError::NotFound(record.identifier().to_string()))?;
            *existing = record.clone();
            Ok(())
        })
        .await
    }

    async fn remove(&self, identifier: &str) -> SyncResult<()> {
        self.mutate(|s| {
            R::table_mut(s).retain(|r| r.identifier() != identifier);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, hour, 0, 0).unwrap()
    }

    fn occurrence(id: &str, hour: u32, detached: bool) -> ExternalEvent {
        ExternalEvent {
            id: id.to_string(),
            calendar_id: "work".to_string(),
            title: "Standup".to_string(),
            start: at(hour),
            end: at(hour + 1),
            all_day: false,
            location: None,
            notes: None,
            last_modified: None,
            detached,
        }
    }

    fn everything() -> DateRange {
        DateRange { from: None, to: None }
    }

    async fn store_with(snapshot: ExternalSnapshot) -> (tempfile::TempDir, SnapshotStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("external.json");
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        let store = SnapshotStore::open(&path).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty_and_undetermined() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(&dir.path().join("none.json")).await.unwrap();

        assert_eq!(store.authorization_status(), AuthorizationStatus::NotDetermined);
        assert!(store.calendars().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_access_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("external.json");

        let store = SnapshotStore::open(&path).await.unwrap();
        assert!(store.request_access().await.unwrap());

        let reopened = SnapshotStore::open(&path).await.unwrap();
        assert_eq!(reopened.authorization_status(), AuthorizationStatus::Authorized);
    }

    #[tokio::test]
    async fn test_denied_access_stays_denied() {
        let (_dir, store) = store_with(ExternalSnapshot {
            authorization: AuthorizationStatus::Denied,
            ..Default::default()
        })
        .await;

        assert!(!store.request_access().await.unwrap());
    }

    #[tokio::test]
    async fn test_events_filtered_by_range_and_calendar() {
        let mut elsewhere = occurrence("b", 9, false);
        elsewhere.calendar_id = "home".to_string();
        let (_dir, store) = store_with(ExternalSnapshot {
            events: vec![occurrence("a", 9, false), occurrence("a", 15, false), elsewhere],
            ..Default::default()
        })
        .await;

        let all = store.events(&everything(), None).await.unwrap();
        assert_eq!(all.len(), 3, "occurrences are returned raw");

        let morning = DateRange {
            from: Some(at(8)),
            to: Some(at(11)),
        };
        let work = vec!["work".to_string()];
        let filtered = store.events(&morning, Some(&work)).await.unwrap();
        assert_eq!(filtered, vec![occurrence("a", 9, false)]);
    }

    #[tokio::test]
    async fn test_save_event_assigns_id_and_timestamp() {
        let (_dir, store) = store_with(ExternalSnapshot::default()).await;

        let saved = store.save_event(&occurrence("", 9, false)).await.unwrap();

        assert!(!saved.id.is_empty());
        assert!(saved.last_modified.is_some());
        assert_eq!(store.events(&everything(), None).await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn test_read_only_calendar_rejects_writes() {
        let (_dir, store) = store_with(ExternalSnapshot {
            calendars: vec![ExternalCalendar {
                id: "work".to_string(),
                title: "Work".to_string(),
                color: None,
                source: None,
                allows_modifications: false,
            }],
            ..Default::default()
        })
        .await;

        let err = store.save_event(&occurrence("", 9, false)).await.unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));
    }

    #[tokio::test]
    async fn test_update_this_occurrence_detaches_it() {
        let (_dir, store) = store_with(ExternalSnapshot {
            events: vec![occurrence("a", 9, false), occurrence("a", 15, false)],
            ..Default::default()
        })
        .await;

        let mut changed = occurrence("a", 15, false);
        changed.title = "Moved standup".to_string();
        let updated = store.update_event(&changed, Span::ThisEvent).await.unwrap();

        assert!(updated.detached);
        assert!(updated.last_modified.is_some());
        let events = store.events(&everything(), None).await.unwrap();
        assert_eq!(events[0].title, "Standup");
        assert_eq!(events[1].title, "Moved standup");
    }

    #[tokio::test]
    async fn test_update_future_occurrences() {
        let (_dir, store) = store_with(ExternalSnapshot {
            events: vec![
                occurrence("a", 9, false),
                occurrence("a", 12, false),
                occurrence("a", 15, false),
            ],
            ..Default::default()
        })
        .await;

        let mut changed = occurrence("a", 12, false);
        changed.title = "Renamed".to_string();
        let updated = store.update_event(&changed, Span::FutureEvents).await.unwrap();
        assert_eq!(updated.start, at(12));

        let titles: Vec<String> = store
            .events(&everything(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Standup", "Renamed", "Renamed"]);
    }

    #[tokio::test]
    async fn test_remove_missing_event_is_not_found() {
        let (_dir, store) = store_with(ExternalSnapshot::default()).await;

        let err = store.remove_event("ghost", Span::ThisEvent).await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_series() {
        let (_dir, store) = store_with(ExternalSnapshot {
            events: vec![occurrence("a", 9, false), occurrence("a", 15, true), occurrence("b", 9, false)],
            ..Default::default()
        })
        .await;

        store.remove_event("a", Span::FutureEvents).await.unwrap();

        let ids: Vec<String> = store
            .events(&everything(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_local_database_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");

        let db = LocalDatabase::open(&path).await.unwrap();
        LocalStore::<Calendar>::insert(&db, Calendar::new("Home")).await.unwrap();
        let event = Event::new("home", "Dinner", at(19), at(21));
        LocalStore::<Event>::insert(&db, event.clone()).await.unwrap();

        let reopened = LocalDatabase::open(&path).await.unwrap();
        let calendars = LocalStore::<Calendar>::records(&reopened).await.unwrap();
        let events = LocalStore::<Event>::records(&reopened).await.unwrap();

        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].title, "Home");
        assert_eq!(events, vec![event]);
    }

    #[tokio::test]
    async fn test_local_database_update_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let db = LocalDatabase::open(&dir.path().join("local.json")).await.unwrap();

        let err = LocalStore::<Event>::update(&db, &Event::new("home", "Ghost", at(1), at(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }
}
