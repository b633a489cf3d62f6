//! Entry point tying a store handle to fetch, deduplication and reconciliation.

use crate::calendar::{Calendar, ExternalCalendar};
use crate::date_range::DateRange;
use crate::error::{SyncError, SyncResult};
use crate::event::{Event, ExternalEvent};
use crate::reconcile::{Reconciliation, deduplicate_events, reconcile_records};
use crate::record::{Syncable, SyncRecord};
use crate::store::{ExternalStore, Span};

/// Synchronizes application records with an external calendar store.
///
/// The store is owned by the caller and handed in here; a center holds no
/// global state, so several centers over different stores can coexist.
pub struct SyncCenter<S> {
    store: S,
}

impl<S: ExternalStore> SyncCenter<S> {
    pub fn new(store: S) -> Self {
        SyncCenter { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ask the store for access. Remember that access can be denied.
    pub async fn request_access(&self) -> SyncResult<bool> {
        self.store.request_access().await
    }

    /// Fails with [`SyncError::Authorization`] unless read access is granted.
    pub fn ensure_authorized(&self) -> SyncResult<()> {
        let status = self.store.authorization_status();
        if !status.is_authorized() {
            return Err(SyncError::Authorization(status));
        }
        Ok(())
    }

    // CALENDARS:

    /// Load calendars from the store. An empty `identifiers` list loads all
    /// of them.
    #[tracing::instrument(skip(self))]
    pub async fn retrieve_calendars(
        &self,
        identifiers: &[String],
    ) -> SyncResult<Vec<ExternalCalendar>> {
        self.ensure_authorized()?;

        let calendars = self.store.calendars().await?;
        if identifiers.is_empty() {
            return Ok(calendars);
        }

        Ok(calendars
            .into_iter()
            .filter(|c| identifiers.contains(&c.id))
            .collect())
    }

    /// Compare calendars stored by the application with the store's.
    pub async fn compare_calendars(
        &self,
        identifiers: &[String],
        stored: Vec<Calendar>,
    ) -> SyncResult<Reconciliation<Calendar, ExternalCalendar>> {
        let calendars = self.retrieve_calendars(identifiers).await?;
        Ok(reconcile_records(stored, calendars))
    }

    // EVENTS:

    /// Load events overlapping `range`, optionally only from `calendars`.
    /// Repeated occurrences of recurring events are collapsed.
    #[tracing::instrument(skip(self))]
    pub async fn retrieve_events(
        &self,
        range: &DateRange,
        calendars: Option<&[String]>,
    ) -> SyncResult<Vec<ExternalEvent>> {
        self.ensure_authorized()?;

        let events = self.store.events(range, calendars).await?;
        let fetched = events.len();
        let events = deduplicate_events(events);
        tracing::debug!(fetched, kept = events.len(), "deduplicated occurrences");

        Ok(events)
    }

    /// Compare events stored by the application with the store's events in
    /// `range`.
    pub async fn compare_events(
        &self,
        range: &DateRange,
        calendars: Option<&[String]>,
        stored: Vec<Event>,
    ) -> SyncResult<Reconciliation<Event, ExternalEvent>> {
        let events = self.retrieve_events(range, calendars).await?;
        Ok(reconcile_records(stored, events))
    }

    // SINGLE RECORDS:

    /// Publish a new calendar and record the identifier the store assigned.
    pub async fn save_calendar(&self, calendar: &mut Calendar) -> SyncResult<()> {
        if !calendar.is_syncable() {
            return Ok(());
        }
        let saved = self.store.save_calendar(&calendar.to_external()).await?;
        calendar.set_identifier(saved.id);
        Ok(())
    }

    pub async fn update_calendar(&self, calendar: &Calendar) -> SyncResult<()> {
        if !calendar.is_syncable() {
            return Ok(());
        }
        self.store.update_calendar(&calendar.to_external()).await?;
        Ok(())
    }

    pub async fn delete_calendar(&self, calendar: &Calendar) -> SyncResult<()> {
        self.store.remove_calendar(&calendar.id).await
    }

    /// Publish a new event and record the identifier and timestamp the store
    /// assigned.
    pub async fn save_event(&self, event: &mut Event) -> SyncResult<()> {
        if !event.is_syncable() {
            return Ok(());
        }
        let saved = self.store.save_event(&event.to_external()).await?;
        event.set_identifier(saved.id);
        event.set_last_modified(saved.last_modified);
        Ok(())
    }

    pub async fn update_event(&self, event: &mut Event, span: Span) -> SyncResult<()> {
        if !event.is_syncable() {
            return Ok(());
        }
        let updated = self.store.update_event(&event.to_external(), span).await?;
        event.set_last_modified(updated.last_modified);
        Ok(())
    }

    pub async fn delete_event(&self, event: &Event, span: Span) -> SyncResult<()> {
        self.store.remove_event(&event.id, span).await
    }
}
