//! Output of a reconciliation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Create,
    Update,
    Delete,
}

impl DiffKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            DiffKind::Create => "+",
            DiffKind::Update => "~",
            DiffKind::Delete => "-",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The actions needed to bring the local collection in line with the external
/// one.
///
/// - `creates`: external entities with no local counterpart
/// - `updates`: local records whose external counterpart changed
/// - `deletes`: local records with no external counterpart
///
/// The three buckets are disjoint by identifier and each keeps the order of
/// the sequence it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation<L, E> {
    creates: Vec<E>,
    updates: Vec<L>,
    deletes: Vec<L>,
}

impl<L, E> Reconciliation<L, E> {
    pub(crate) fn new(creates: Vec<E>, updates: Vec<L>, deletes: Vec<L>) -> Self {
        Reconciliation {
            creates,
            updates,
            deletes,
        }
    }

    pub fn creates(&self) -> &[E] {
        &self.creates
    }

    pub fn updates(&self) -> &[L] {
        &self.updates
    }

    pub fn deletes(&self) -> &[L] {
        &self.deletes
    }

    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.creates.len(), self.updates.len(), self.deletes.len())
    }

    pub fn into_parts(self) -> (Vec<E>, Vec<L>, Vec<L>) {
        (self.creates, self.updates, self.deletes)
    }
}

impl<L: Identified, E: Identified> Reconciliation<L, E> {
    /// Identifiers in the given bucket, in bucket order.
    pub fn identifiers(&self, kind: DiffKind) -> Vec<&str> {
        match kind {
            DiffKind::Create => self.creates.iter().map(|e| e.identifier()).collect(),
            DiffKind::Update => self.updates.iter().map(|l| l.identifier()).collect(),
            DiffKind::Delete => self.deletes.iter().map(|l| l.identifier()).collect(),
        }
    }
}

impl<L, E> Default for Reconciliation<L, E> {
    fn default() -> Self {
        Reconciliation::new(Vec::new(), Vec::new(), Vec::new())
    }
}
