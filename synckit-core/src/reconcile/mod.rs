//! Identity-keyed three-way diff between local records and external entities.

pub mod change;
pub mod dedup;
mod result;

use std::collections::{HashMap, HashSet};

use crate::record::{Identified, SyncRecord, Syncable};

pub use change::{ChangeDetector, RecordChanges, timestamp_changed};
pub use dedup::{deduplicate, deduplicate_events};
pub use result::{DiffKind, Reconciliation};

/// Partition `local` and `external` into creates, updates and deletes.
///
/// Non-syncable local records are dropped up front. The remaining steps run in
/// a fixed order because each one works on what the previous left over:
///
/// 1. deletes: local records whose identifier is missing from `external`
/// 2. creates: external entities whose identifier is missing from the
///    local records that survived step 1
/// 3. updates: surviving local records with a surviving external entity of the
///    same identifier for which `detector` reports a change
///
/// Matched pairs without a change appear in no bucket.
pub fn reconcile<L, E, D>(local: Vec<L>, external: Vec<E>, detector: &D) -> Reconciliation<L, E>
where
    L: Syncable,
    E: Identified,
    D: ChangeDetector<L, E> + ?Sized,
{
    let external_ids: HashSet<String> = external
        .iter()
        .map(|e| e.identifier().to_string())
        .collect();

    let (deletes, remaining_local): (Vec<L>, Vec<L>) = local
        .into_iter()
        .filter(|l| l.is_syncable())
        .partition(|l| !external_ids.contains(l.identifier()));

    let remaining_local_ids: HashSet<String> = remaining_local
        .iter()
        .map(|l| l.identifier().to_string())
        .collect();

    let (creates, remaining_external): (Vec<E>, Vec<E>) = external
        .into_iter()
        .partition(|e| !remaining_local_ids.contains(e.identifier()));

    // Detached occurrences can leave several external entries per identifier.
    let mut external_by_id: HashMap<&str, Vec<&E>> = HashMap::new();
    for e in &remaining_external {
        external_by_id.entry(e.identifier()).or_default().push(e);
    }

    let updates: Vec<L> = remaining_local
        .into_iter()
        .filter(|l| {
            external_by_id
                .get(l.identifier())
                .is_some_and(|matches| matches.iter().any(|&e| detector.changed(l, e)))
        })
        .collect();

    tracing::debug!(
        creates = creates.len(),
        updates = updates.len(),
        deletes = deletes.len(),
        "reconciled"
    );

    Reconciliation::new(creates, updates, deletes)
}

/// [`reconcile`] using each record's own [`SyncRecord::changes_from`].
pub fn reconcile_records<R: SyncRecord>(
    local: Vec<R>,
    external: Vec<R::External>,
) -> Reconciliation<R, R::External> {
    reconcile(local, external, &RecordChanges)
}
