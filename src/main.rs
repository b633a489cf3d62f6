mod commands;
mod config;
mod render;
mod snapshot;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use synckit_core::date_range::DateRange;
use synckit_core::store::Span;
use tracing_subscriber::EnvFilter;

use crate::commands::Context;
use crate::config::SyncConfig;

#[derive(Parser)]
#[command(name = "synckit")]
#[command(about = "Reconcile your local calendars and events with an external calendar store")]
struct Cli {
    /// Path to the configuration file (defaults to ~/.config/synckit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    /// Only operate on this calendar (by id); repeat for several
    #[arg(short, long = "calendar")]
    calendars: Vec<String>,

    /// Events from this date (YYYY-MM-DD, or "start" for all past events)
    #[arg(long)]
    from: Option<String>,

    /// Events until this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// List every change instead of a summary
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpanArg {
    /// Only the occurrence itself
    This,
    /// The occurrence and every later one in its series
    Future,
}

impl From<SpanArg> for Span {
    fn from(arg: SpanArg) -> Self {
        match arg {
            SpanArg::This => Span::ThisEvent,
            SpanArg::Future => Span::FutureEvents,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show what a sync would create, update and delete
    Status {
        #[command(flatten)]
        selection: Selection,

        /// Print the reconciliation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile and apply the changes to both stores
    Sync {
        #[command(flatten)]
        selection: Selection,

        /// Which occurrences of recurring events updates and deletes touch
        #[arg(long, value_enum, default_value = "this")]
        span: SpanArg,
    },
    /// Show how recurring event occurrences collapse before comparison
    Dedup {
        #[command(flatten)]
        selection: Selection,
    },
}

impl Commands {
    fn selection(&self) -> &Selection {
        match self {
            Commands::Status { selection, .. }
            | Commands::Sync { selection, .. }
            | Commands::Dedup { selection } => selection,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SYNCKIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SyncConfig::load(cli.config.as_deref())?;

    let selection = cli.command.selection();
    let range = DateRange::from_args(
        selection.from.as_deref(),
        selection.to.as_deref(),
        config.sync_days,
    )
    .map_err(|e| anyhow::anyhow!(e))?;
    let verbose = selection.verbose;
    let ctx = Context::load(&config, selection.calendars.clone(), range).await?;

    match cli.command {
        Commands::Status { json, .. } => commands::status::run(&ctx, verbose, json).await,
        Commands::Sync { span, .. } => commands::sync::run(&ctx, span.into(), verbose).await,
        Commands::Dedup { .. } => commands::dedup::run(&ctx, verbose).await,
    }
}
