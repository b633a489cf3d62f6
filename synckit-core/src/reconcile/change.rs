//! Change detection between a local record and its external counterpart.

use chrono::{DateTime, Utc};

use crate::record::SyncRecord;

/// Decides whether a matched local/external pair needs an update.
///
/// Implementations must be pure: the reconciler may call them any number of
/// times, in any order.
pub trait ChangeDetector<L, E> {
    fn changed(&self, local: &L, external: &E) -> bool;
}

impl<L, E, F> ChangeDetector<L, E> for F
where
    F: Fn(&L, &E) -> bool,
{
    fn changed(&self, local: &L, external: &E) -> bool {
        self(local, external)
    }
}

/// Delegates to [`SyncRecord::changes_from`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordChanges;

impl<R: SyncRecord> ChangeDetector<R, R::External> for RecordChanges {
    fn changed(&self, local: &R, external: &R::External) -> bool {
        local.changes_from(external)
    }
}

/// Timestamp rule for events: an unknown timestamp on either side counts as
/// changed, otherwise only a strictly newer external timestamp does.
pub fn timestamp_changed(
    local: Option<DateTime<Utc>>,
    external: Option<DateTime<Utc>>,
) -> bool {
    match (local, external) {
        (Some(local), Some(external)) => external > local,
        _ => true,
    }
}
