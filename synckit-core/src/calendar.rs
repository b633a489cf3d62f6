//! Calendar types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{Identified, SyncRecord, Syncable};

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

/// A calendar as the external store represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCalendar {
    pub id: String,
    pub title: String,
    /// Hex color, e.g. "#3366ff"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Account or source the calendar belongs to (e.g. "iCloud")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default = "default_true")]
    pub allows_modifications: bool,
}

impl Identified for ExternalCalendar {
    fn identifier(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ExternalCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A calendar stored in the application's own database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub syncable: bool,
}

impl Calendar {
    /// A new, not yet published calendar. The identifier is assigned by the
    /// external store on save.
    pub fn new(title: &str) -> Self {
        Calendar {
            id: String::new(),
            title: title.to_string(),
            color: None,
            syncable: true,
        }
    }
}

impl Identified for Calendar {
    fn identifier(&self) -> &str {
        &self.id
    }
}

impl Syncable for Calendar {
    fn is_syncable(&self) -> bool {
        self.syncable
    }
}

impl SyncRecord for Calendar {
    type External = ExternalCalendar;

    fn to_external(&self) -> ExternalCalendar {
        ExternalCalendar {
            id: self.id.clone(),
            title: self.title.clone(),
            color: self.color.clone(),
            source: None,
            allows_modifications: true,
        }
    }

    fn from_external(external: &ExternalCalendar) -> Self {
        Calendar {
            id: external.id.clone(),
            title: external.title.clone(),
            color: external.color.clone(),
            syncable: true,
        }
    }

    /// Calendars carry no modification timestamp, so compare the fields the
    /// application mirrors.
    fn changes_from(&self, external: &ExternalCalendar) -> bool {
        self.title != external.title || self.color != external.color
    }

    fn set_identifier(&mut self, identifier: String) {
        self.id = identifier;
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external(id: &str, title: &str, color: Option<&str>) -> ExternalCalendar {
        ExternalCalendar {
            id: id.to_string(),
            title: title.to_string(),
            color: color.map(str::to_string),
            source: Some("Local".to_string()),
            allows_modifications: true,
        }
    }

    #[test]
    fn test_changes_from_detects_title_and_color() {
        let local = Calendar::from_external(&external("c1", "Work", Some("#ff0000")));

        assert!(!local.changes_from(&external("c1", "Work", Some("#ff0000"))));
        assert!(local.changes_from(&external("c1", "Office", Some("#ff0000"))));
        assert!(local.changes_from(&external("c1", "Work", None)));
    }

    #[test]
    fn test_source_is_not_compared() {
        let local = Calendar::from_external(&external("c1", "Work", None));
        let mut other = external("c1", "Work", None);
        other.source = Some("iCloud".to_string());

        assert!(!local.changes_from(&other));
    }

    #[test]
    fn test_syncable_defaults_to_true_when_deserializing() {
        let calendar: Calendar = serde_json::from_str(r#"{"id":"c1","title":"Home"}"#).unwrap();
        assert!(calendar.is_syncable());

        let calendar: Calendar =
            serde_json::from_str(r#"{"id":"c1","title":"Home","syncable":false}"#).unwrap();
        assert!(!calendar.is_syncable());
    }
}
