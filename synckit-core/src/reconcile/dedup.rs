//! Collapsing of recurring-event occurrences.
//!
//! Fetching events over a time interval expands every recurring series into
//! one occurrence per instance, all sharing the series identifier. Only one
//! template-generated occurrence per identifier is kept. Detached occurrences
//! are always kept, so several detached occurrences of the same series all
//! survive.

use std::collections::HashSet;

use crate::event::ExternalEvent;
use crate::record::Occurrence;

/// Keep the first non-detached occurrence of each identifier and every
/// detached occurrence, preserving input order.
pub fn deduplicate<E: Occurrence>(occurrences: impl IntoIterator<Item = E>) -> Vec<E> {
    let mut seen_templates: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();

    for occurrence in occurrences {
        if occurrence.is_detached() {
            kept.push(occurrence);
        } else if seen_templates.insert(occurrence.identifier().to_string()) {
            kept.push(occurrence);
        }
    }

    kept
}

pub fn deduplicate_events(events: Vec<ExternalEvent>) -> Vec<ExternalEvent> {
    deduplicate(events)
}
