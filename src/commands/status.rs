use anyhow::Result;
use owo_colors::OwoColorize;

use super::{Context, create_spinner};
use crate::render::{render_event_reconciliation, render_reconciliation};

pub async fn run(ctx: &Context, verbose: bool, json: bool) -> Result<()> {
    let spinner = create_spinner("Comparing".to_string());
    let result = async {
        let calendars = ctx
            .center
            .compare_calendars(&ctx.calendar_ids, ctx.stored_calendars().await?)
            .await?;
        let events = ctx
            .center
            .compare_events(&ctx.range, ctx.calendar_filter(), ctx.stored_events().await?)
            .await?;
        anyhow::Ok((calendars, events))
    }
    .await;
    spinner.finish_and_clear();
    let (calendars, events) = result?;

    if json {
        let out = serde_json::json!({
            "calendars": calendars,
            "events": events,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "Calendars".bold());
    println!("{}", render_reconciliation("calendar", &calendars, verbose));
    println!();
    println!("{}", "Events".bold());
    println!("{}", render_event_reconciliation(&events, verbose));

    if !calendars.is_empty() || !events.is_empty() {
        println!("\nRun `synckit sync` to apply these changes.");
    }

    Ok(())
}
