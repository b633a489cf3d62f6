//! Contracts for the stores on either side of a reconciliation.
//!
//! `ExternalStore` is the authoritative calendar store (the system calendar,
//! a provider account, ...). `LocalStore` is the application's own database.
//! Both are injected by the caller; nothing in this crate owns a store.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::calendar::ExternalCalendar;
use crate::date_range::DateRange;
use crate::error::SyncResult;
use crate::event::ExternalEvent;

/// Whether the application may read the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationStatus::Authorized)
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthorizationStatus::NotDetermined => "not determined",
            AuthorizationStatus::Restricted => "restricted",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Authorized => "authorized",
        };
        write!(f, "{}", s)
    }
}

/// Which occurrences of a recurring event an update or removal touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    #[default]
    ThisEvent,
    FutureEvents,
}

/// The authoritative calendar store.
///
/// Fetch methods return raw results: events are not deduplicated and no
/// authorization check is implied. `SyncCenter` layers both on top.
#[async_trait]
pub trait ExternalStore: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask for read/write access. Returns whether access was granted.
    async fn request_access(&self) -> SyncResult<bool>;

    async fn calendars(&self) -> SyncResult<Vec<ExternalCalendar>>;

    /// Occurrences overlapping `range`, restricted to `calendars` when given.
    async fn events(
        &self,
        range: &DateRange,
        calendars: Option<&[String]>,
    ) -> SyncResult<Vec<ExternalEvent>>;

    /// Store a new calendar. The returned calendar carries the assigned id.
    async fn save_calendar(&self, calendar: &ExternalCalendar) -> SyncResult<ExternalCalendar>;

    async fn update_calendar(&self, calendar: &ExternalCalendar) -> SyncResult<ExternalCalendar>;

    async fn remove_calendar(&self, calendar_id: &str) -> SyncResult<()>;

    /// Store a new event. The returned event carries the assigned id and
    /// last-modified timestamp.
    async fn save_event(&self, event: &ExternalEvent) -> SyncResult<ExternalEvent>;

    async fn update_event(&self, event: &ExternalEvent, span: Span) -> SyncResult<ExternalEvent>;

    async fn remove_event(&self, event_id: &str, span: Span) -> SyncResult<()>;
}

/// The application's own database for one kind of record.
#[async_trait]
pub trait LocalStore<R: Send + Sync + 'static>: Send + Sync {
    async fn records(&self) -> SyncResult<Vec<R>>;

    async fn insert(&self, record: R) -> SyncResult<()>;

    /// Replace the record with the same identifier.
    async fn update(&self, record: &R) -> SyncResult<()>;

    async fn remove(&self, identifier: &str) -> SyncResult<()>;
}
