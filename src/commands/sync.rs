use anyhow::Result;
use owo_colors::OwoColorize;
use synckit_core::apply::{apply_calendars, apply_events};
use synckit_core::store::Span;

use super::{Context, create_spinner};
use crate::render::{Render, render_event_reconciliation, render_reconciliation};

pub async fn run(ctx: &Context, span: Span, verbose: bool) -> Result<()> {
    // Calendars first, so events of newly created calendars find their parent.
    let spinner = create_spinner("Syncing calendars".to_string());
    let calendars = ctx
        .center
        .compare_calendars(&ctx.calendar_ids, ctx.stored_calendars().await?)
        .await;
    spinner.finish_and_clear();
    let calendars = calendars?;

    println!("{}", "Calendars".bold());
    println!("{}", render_reconciliation("calendar", &calendars, verbose));
    let mut report = apply_calendars(calendars, &ctx.local, ctx.center.store()).await;

    let spinner = create_spinner("Syncing events".to_string());
    let events = ctx
        .center
        .compare_events(&ctx.range, ctx.calendar_filter(), ctx.stored_events().await?)
        .await;
    spinner.finish_and_clear();
    let events = events?;

    println!();
    println!("{}", "Events".bold());
    println!("{}", render_event_reconciliation(&events, verbose));
    report.merge(apply_events(events, &ctx.local, ctx.center.store(), span).await);

    println!();
    println!("{}", report.render());

    if !report.is_success() {
        anyhow::bail!(
            "{} change(s) could not be applied. Run `synckit sync` again to retry.",
            report.failures.len()
        );
    }

    Ok(())
}
