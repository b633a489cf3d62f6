//! Core types for synckit.
//!
//! This crate reconciles calendars and events kept in an application's own
//! database against an external calendar store:
//! - `reconcile` computes create/update/delete sets (pure, no I/O)
//! - `center` fetches from an injected store and reconciles
//! - `apply` carries a reconciliation out against both stores

pub mod apply;
pub mod calendar;
pub mod center;
pub mod date_range;
pub mod error;
pub mod event;
pub mod reconcile;
pub mod record;
pub mod store;

#[cfg(test)]
mod testing;

pub use calendar::{Calendar, ExternalCalendar};
pub use center::SyncCenter;
pub use error::{SyncError, SyncResult};
pub use event::{Event, ExternalEvent};
pub use reconcile::{Reconciliation, deduplicate_events, reconcile, reconcile_records};
pub use record::{Identified, Occurrence, SyncRecord, Syncable};
