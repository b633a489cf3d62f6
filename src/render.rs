//! TUI rendering traits for synckit types.
//!
//! Extension traits that add colored terminal rendering to synckit-core
//! types using owo_colors.

use std::fmt::Display;

use owo_colors::OwoColorize;
use synckit_core::apply::ApplyReport;
use synckit_core::reconcile::{DiffKind, Reconciliation};
use synckit_core::{Event, ExternalEvent, Identified};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        colorize_diff(*self, self.symbol())
    }
}

/// Colorize text according to the diff kind
fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

fn render_line(kind: DiffKind, item: &(impl Display + Identified)) -> String {
    format!(
        "   {} {} {}",
        kind.render(),
        colorize_diff(kind, &item.to_string()),
        item.identifier().dimmed()
    )
}

/// Threshold for compact view (show counts instead of individual entries)
const COMPACT_THRESHOLD: usize = 5;

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Render a reconciliation under a heading, e.g. "calendar" or "event".
///
/// Uses a compact view with counts when there are many entries and
/// `verbose` is false.
pub fn render_reconciliation<L, E>(
    noun: &str,
    reconciliation: &Reconciliation<L, E>,
    verbose: bool,
) -> String
where
    L: Display + Identified,
    E: Display + Identified,
{
    if reconciliation.is_empty() {
        return format!("   No {} changes", noun).dimmed().to_string();
    }

    let (creates, updates, deletes) = reconciliation.counts();
    let mut lines = Vec::new();

    if verbose || creates + updates + deletes <= COMPACT_THRESHOLD {
        for item in reconciliation.creates() {
            lines.push(render_line(DiffKind::Create, item));
        }
        for item in reconciliation.updates() {
            lines.push(render_line(DiffKind::Update, item));
        }
        for item in reconciliation.deletes() {
            lines.push(render_line(DiffKind::Delete, item));
        }
    } else {
        let summary = [
            (DiffKind::Create, creates, "new"),
            (DiffKind::Update, updates, "changed"),
            (DiffKind::Delete, deletes, "deleted"),
        ];
        for (kind, count, label) in summary {
            if count > 0 {
                let text = format!("({} {} {})", count, label, pluralize(noun, count));
                lines.push(format!("   {} {}", kind.render(), colorize_diff(kind, &text)));
            }
        }
    }

    lines.join("\n")
}

/// Events additionally show when they start.
pub fn render_event_reconciliation(
    reconciliation: &Reconciliation<Event, ExternalEvent>,
    verbose: bool,
) -> String {
    let mut out = render_reconciliation("event", reconciliation, verbose);
    if verbose {
        let starts: Vec<String> = reconciliation
            .creates()
            .iter()
            .map(|e| format!("      {} starts {}", e.title, e.start.format("%Y-%m-%d %H:%M")))
            .collect();
        if !starts.is_empty() {
            out.push('\n');
            out.push_str(&starts.join("\n").dimmed().to_string());
        }
    }
    out
}

impl Render for ApplyReport {
    fn render(&self) -> String {
        let (created, updated, deleted) = self.counts();
        let mut lines = vec![format!(
            "   Applied: {} created, {} updated, {} deleted",
            created, updated, deleted
        )];

        for failure in &self.failures {
            lines.push(format!(
                "   {} {} {}: {}",
                failure.kind.render(),
                failure.identifier,
                "failed".red(),
                failure.error.to_string().red()
            ));
        }

        lines.join("\n")
    }
}
