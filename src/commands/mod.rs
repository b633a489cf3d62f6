pub mod dedup;
pub mod status;
pub mod sync;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use synckit_core::date_range::DateRange;
use synckit_core::store::{AuthorizationStatus, ExternalStore, LocalStore};
use synckit_core::{Calendar, Event, SyncCenter};

use crate::config::SyncConfig;
use crate::snapshot::{LocalDatabase, SnapshotStore};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Stores and selection shared by every command, loaded once per run.
pub struct Context {
    pub center: SyncCenter<SnapshotStore>,
    pub local: LocalDatabase,
    /// Calendar ids to restrict to; empty means all calendars
    pub calendar_ids: Vec<String>,
    pub range: DateRange,
}

impl Context {
    pub async fn load(config: &SyncConfig, calendar_ids: Vec<String>, range: DateRange) -> Result<Self> {
        let external_path = config.external_path();
        let store = SnapshotStore::open(&external_path)
            .await
            .with_context(|| format!("Failed to open external store {}", external_path.display()))?;

        let local_path = config.local_path();
        let local = LocalDatabase::open(&local_path)
            .await
            .with_context(|| format!("Failed to open local database {}", local_path.display()))?;

        let center = SyncCenter::new(store);
        if center.store().authorization_status() == AuthorizationStatus::NotDetermined {
            tracing::info!("requesting access to the external store");
            center.request_access().await?;
        }

        Ok(Context {
            center,
            local,
            calendar_ids,
            range,
        })
    }

    /// `None` when every calendar is selected.
    pub fn calendar_filter(&self) -> Option<&[String]> {
        if self.calendar_ids.is_empty() {
            None
        } else {
            Some(&self.calendar_ids)
        }
    }

    /// Stored calendars within the selection.
    pub async fn stored_calendars(&self) -> Result<Vec<Calendar>> {
        let calendars: Vec<Calendar> = LocalStore::<Calendar>::records(&self.local).await?;
        Ok(calendars
            .into_iter()
            .filter(|c| self.calendar_ids.is_empty() || self.calendar_ids.contains(&c.id))
            .collect())
    }

    /// Stored events within the selection and the date range. Events outside
    /// the range were not fetched, so they must not be compared.
    pub async fn stored_events(&self) -> Result<Vec<Event>> {
        let events: Vec<Event> = LocalStore::<Event>::records(&self.local).await?;
        Ok(events
            .into_iter()
            .filter(|e| self.calendar_ids.is_empty() || self.calendar_ids.contains(&e.calendar_id))
            .filter(|e| self.range.overlaps(e.start, e.end))
            .collect())
    }
}
