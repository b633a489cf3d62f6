//! Applying a reconciliation to both stores.
//!
//! - creates: a new local record is built from the external entity and
//!   inserted into the local store. Occurrences of one series sharing an
//!   identifier become a single record holding the newest shape
//! - updates: the local record is pushed to the external store, then its
//!   last-modified timestamp is refreshed from the store's answer
//! - deletes: the external counterpart is removed, then the local record
//!
//! Every action is attempted. Failures are collected per action; nothing is
//! retried or rolled back.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::calendar::Calendar;
use crate::error::{SyncError, SyncResult};
use crate::event::Event;
use crate::reconcile::{DiffKind, Reconciliation};
use crate::record::{Identified, SyncRecord};
use crate::store::{ExternalStore, LocalStore, Span};

/// A single action that could not be applied.
#[derive(Debug)]
pub struct ApplyFailure {
    pub kind: DiffKind,
    pub identifier: String,
    pub error: SyncError,
}

/// What happened while applying a reconciliation.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub failures: Vec<ApplyFailure>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.created.len(), self.updated.len(), self.deleted.len())
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ApplyReport) {
        self.created.extend(other.created);
        self.updated.extend(other.updated);
        self.deleted.extend(other.deleted);
        self.failures.extend(other.failures);
    }

    fn fail(&mut self, kind: DiffKind, identifier: &str, error: SyncError) {
        tracing::warn!(%kind, identifier, %error, "failed to apply change");
        self.failures.push(ApplyFailure {
            kind,
            identifier: identifier.to_string(),
            error,
        });
    }
}

/// The external store seen through one record kind.
#[async_trait]
pub trait ExternalTarget<R: SyncRecord>: Send + Sync {
    /// Push `shape` as the new state of an existing entity. Returns the
    /// last-modified timestamp the store reports, if it keeps one.
    async fn push_update(&self, shape: &R::External) -> SyncResult<Option<DateTime<Utc>>>;

    async fn remove(&self, identifier: &str) -> SyncResult<()>;
}

/// Calendar access to an [`ExternalStore`].
pub struct CalendarTarget<'a, S: ?Sized>(pub &'a S);

#[async_trait]
impl<S: ExternalStore + ?Sized> ExternalTarget<Calendar> for CalendarTarget<'_, S> {
    async fn push_update(
        &self,
        shape: &crate::calendar::ExternalCalendar,
    ) -> SyncResult<Option<DateTime<Utc>>> {
        self.0.update_calendar(shape).await?;
        Ok(None)
    }

    async fn remove(&self, identifier: &str) -> SyncResult<()> {
        self.0.remove_calendar(identifier).await
    }
}

/// Event access to an [`ExternalStore`], with the span used for recurring
/// events.
pub struct EventTarget<'a, S: ?Sized> {
    pub store: &'a S,
    pub span: Span,
}

#[async_trait]
impl<S: ExternalStore + ?Sized> ExternalTarget<Event> for EventTarget<'_, S> {
    async fn push_update(
        &self,
        shape: &crate::event::ExternalEvent,
    ) -> SyncResult<Option<DateTime<Utc>>> {
        let updated = self.store.update_event(shape, self.span).await?;
        Ok(updated.last_modified)
    }

    async fn remove(&self, identifier: &str) -> SyncResult<()> {
        self.store.remove_event(identifier, self.span).await
    }
}

/// Apply `reconciliation` through `local` and `target`.
pub async fn apply<R, L, T>(
    reconciliation: Reconciliation<R, R::External>,
    local: &L,
    target: &T,
) -> ApplyReport
where
    R: SyncRecord + Send + Sync + 'static,
    R::External: Send + Sync,
    L: LocalStore<R> + ?Sized,
    T: ExternalTarget<R> + ?Sized,
{
    let (creates, updates, deletes) = reconciliation.into_parts();
    let mut report = ApplyReport::default();

    let mut pending: Vec<R> = Vec::with_capacity(creates.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for external in creates {
        match positions.get(external.identifier()) {
            Some(&i) => {
                if pending[i].changes_from(&external) {
                    pending[i] = R::from_external(&external);
                }
            }
            None => {
                positions.insert(external.identifier().to_string(), pending.len());
                pending.push(R::from_external(&external));
            }
        }
    }

    for record in pending {
        let identifier = record.identifier().to_string();
        match local.insert(record).await {
            Ok(()) => report.created.push(identifier),
            Err(e) => report.fail(DiffKind::Create, &identifier, e),
        }
    }

    for mut record in updates {
        let identifier = record.identifier().to_string();
        let result = async {
            let last_modified = target.push_update(&record.to_external()).await?;
            record.set_last_modified(last_modified);
            local.update(&record).await
        }
        .await;
        match result {
            Ok(()) => report.updated.push(identifier),
            Err(e) => report.fail(DiffKind::Update, &identifier, e),
        }
    }

    for record in deletes {
        let identifier = record.identifier().to_string();
        let result = async {
            match target.remove(&identifier).await {
                // Already gone from the external store
                Ok(()) | Err(SyncError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            local.remove(&identifier).await
        }
        .await;
        match result {
            Ok(()) => report.deleted.push(identifier),
            Err(e) => report.fail(DiffKind::Delete, &identifier, e),
        }
    }

    tracing::debug!(
        created = report.created.len(),
        updated = report.updated.len(),
        deleted = report.deleted.len(),
        failed = report.failures.len(),
        "applied reconciliation"
    );

    report
}

#[tracing::instrument(skip_all)]
pub async fn apply_calendars<S, L>(
    reconciliation: Reconciliation<Calendar, crate::calendar::ExternalCalendar>,
    local: &L,
    store: &S,
) -> ApplyReport
where
    S: ExternalStore + ?Sized,
    L: LocalStore<Calendar> + ?Sized,
{
    apply(reconciliation, local, &CalendarTarget(store)).await
}

#[tracing::instrument(skip(reconciliation, local, store))]
pub async fn apply_events<S, L>(
    reconciliation: Reconciliation<Event, crate::event::ExternalEvent>,
    local: &L,
    store: &S,
    span: Span,
) -> ApplyReport
where
    S: ExternalStore + ?Sized,
    L: LocalStore<Event> + ?Sized,
{
    apply(reconciliation, local, &EventTarget { store, span }).await
}
