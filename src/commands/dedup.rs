use anyhow::Result;
use owo_colors::OwoColorize;
use synckit_core::deduplicate_events;
use synckit_core::store::ExternalStore;

use super::Context;

/// Show how many fetched occurrences survive deduplication, per series.
pub async fn run(ctx: &Context, verbose: bool) -> Result<()> {
    ctx.center.ensure_authorized()?;

    let raw = ctx
        .center
        .store()
        .events(&ctx.range, ctx.calendar_filter())
        .await?;
    let raw_count = raw.len();
    let kept = deduplicate_events(raw.clone());

    println!(
        "{} occurrences fetched, {} kept after collapsing recurring events",
        raw_count,
        kept.len().green()
    );

    if verbose {
        for event in &kept {
            let repeats = raw.iter().filter(|e| e.id == event.id).count();
            let marker = if event.detached { " (detached)" } else { "" };
            println!(
                "   {} {}{} {}",
                event.title,
                format!("x{}", repeats).dimmed(),
                marker.yellow(),
                event.id.dimmed()
            );
        }
    }

    Ok(())
}
