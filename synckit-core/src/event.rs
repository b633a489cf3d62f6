//! Event types.
//!
//! `ExternalEvent` is one occurrence as the external store reports it; a
//! recurring series shows up as many occurrences sharing the same `id`.
//! `Event` is the application's own copy.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reconcile::change::timestamp_changed;
use crate::record::{Identified, Occurrence, SyncRecord, Syncable};

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

/// An event occurrence as the external store represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalEvent {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    // Sync Infrastructure
    /// Last modification timestamp reported by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// True if this occurrence was individually modified and no longer
    /// follows its series template
    #[serde(default)]
    pub detached: bool,
}

impl Identified for ExternalEvent {
    fn identifier(&self) -> &str {
        &self.id
    }
}

impl Occurrence for ExternalEvent {
    fn is_detached(&self) -> bool {
        self.detached
    }
}

impl fmt::Display for ExternalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// An event stored in the application's own database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub syncable: bool,
}

impl Event {
    /// A new, not yet published event in `calendar_id`.
    pub fn new(calendar_id: &str, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Event {
            id: String::new(),
            calendar_id: calendar_id.to_string(),
            title: title.to_string(),
            start,
            end,
            all_day: false,
            location: None,
            notes: None,
            last_modified: None,
            syncable: true,
        }
    }
}

impl Identified for Event {
    fn identifier(&self) -> &str {
        &self.id
    }
}

impl Syncable for Event {
    fn is_syncable(&self) -> bool {
        self.syncable
    }
}

impl SyncRecord for Event {
    type External = ExternalEvent;

    fn to_external(&self) -> ExternalEvent {
        ExternalEvent {
            id: self.id.clone(),
            calendar_id: self.calendar_id.clone(),
            title: self.title.clone(),
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            location: self.location.clone(),
            notes: self.notes.clone(),
            last_modified: self.last_modified,
            detached: false,
        }
    }

    fn from_external(external: &ExternalEvent) -> Self {
        Event {
            id: external.id.clone(),
            calendar_id: external.calendar_id.clone(),
            title: external.title.clone(),
            start: external.start,
            end: external.end,
            all_day: external.all_day,
            location: external.location.clone(),
            notes: external.notes.clone(),
            last_modified: external.last_modified,
            syncable: true,
        }
    }

    fn changes_from(&self, external: &ExternalEvent) -> bool {
        timestamp_changed(self.last_modified, external.last_modified)
    }

    fn set_identifier(&mut self, identifier: String) {
        self.id = identifier;
    }

    fn set_last_modified(&mut self, last_modified: Option<DateTime<Utc>>) {
        self.last_modified = last_modified;
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
