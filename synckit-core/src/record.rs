//! Capability traits shared by every kind of synchronized entity.
//!
//! Local records (what the application stores in its own database) and
//! external shapes (what the external calendar store hands back) are matched
//! purely by identifier. Each entity kind implements these traits instead of
//! inheriting from a common base type.

use chrono::{DateTime, Utc};

/// Anything carrying a string identifier.
pub trait Identified {
    fn identifier(&self) -> &str;
}

/// A local record that may opt out of synchronization.
pub trait Syncable: Identified {
    /// Non-syncable records are invisible to reconciliation: they are never
    /// created, updated or deleted.
    fn is_syncable(&self) -> bool {
        true
    }
}

/// A local record paired with the external shape it mirrors.
pub trait SyncRecord: Syncable + Sized {
    type External: Identified;

    /// The form this record takes when pushed to the external store.
    fn to_external(&self) -> Self::External;

    /// Build a new local record for an external entity that has no local
    /// counterpart yet.
    fn from_external(external: &Self::External) -> Self;

    /// Whether `external` differs enough from this record to need an update.
    fn changes_from(&self, external: &Self::External) -> bool;

    fn set_identifier(&mut self, identifier: String);

    /// Record the store's last-modified timestamp. Kinds without timestamps
    /// ignore it.
    fn set_last_modified(&mut self, _last_modified: Option<DateTime<Utc>>) {}
}

/// An occurrence produced by expanding a recurring series.
pub trait Occurrence: Identified {
    /// True for a single modified instance of a series, false for instances
    /// generated from the series template.
    fn is_detached(&self) -> bool;
}
