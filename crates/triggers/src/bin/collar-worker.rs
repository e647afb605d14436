//! collar-worker: local driver for the collar telemetry handlers.
//!
//! Reads newline-delimited change events from a file or stdin:
//!
//! ```json
//! {"path": "/users/u1/pets/rex/collar_data/bpm", "value": 131}
//! ```
//!
//! Each event is handled on its own task, at most `max_instances` at a
//! time, against an in-memory store optionally seeded from a snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use smartcollar_core::config::{load_dotenv, Config};
use smartcollar_storage::MemoryStore;
use smartcollar_triggers::{AlertHandlers, FeedRunner, MonitorContext, TriggerRouter};

// ── CLI ─────────────────────────────────────────────────────────────

/// Runs collar telemetry events through the alert handlers.
#[derive(Parser, Debug)]
#[command(name = "collar-worker", version, about)]
struct Cli {
    /// Event feed (NDJSON). Reads stdin when omitted or "-".
    #[arg(long)]
    events: Option<PathBuf>,

    /// JSON snapshot to seed the store with.
    #[arg(long, env = "STORE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Write the final store tree here on exit.
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Maximum number of handlers running at once.
    #[arg(long, env = "MAX_INSTANCES")]
    max_instances: Option<usize>,
}

async fn open_feed(events: Option<&PathBuf>) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match events {
        Some(path) if path.as_os_str() != "-" => {
            let file = tokio::fs::File::open(path).await?;
            info!(path = %path.display(), "reading events from file");
            Ok(Box::new(BufReader::new(file)))
        }
        _ => {
            info!("reading events from stdin");
            Ok(Box::new(BufReader::new(tokio::io::stdin())))
        }
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the feed ends.
        std::future::pending::<()>().await;
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(snapshot) = cli.snapshot.clone() {
        config.store.snapshot_path = Some(snapshot);
    }
    if let Some(max) = cli.max_instances {
        config.runtime.max_instances = max.max(1);
    }
    config.log_summary();

    let store = Arc::new(match &config.store.snapshot_path {
        Some(path) => MemoryStore::load_snapshot(path)?,
        None => MemoryStore::new(),
    });

    let ctx = MonitorContext::from_config(&config, store.clone())?;
    let router = TriggerRouter::new(Arc::new(AlertHandlers::new(ctx)));
    let runner = FeedRunner::new(router, config.runtime.max_instances);

    let feed = open_feed(cli.events.as_ref()).await?;
    info!(max_instances = config.runtime.max_instances, "collar-worker starting");
    let summary = runner.run(feed, ctrl_c()).await?;
    info!(
        events = summary.accepted,
        malformed = summary.malformed,
        failed = summary.failed,
        "collar-worker finished"
    );

    if let Some(path) = &cli.dump {
        store.save_snapshot(path)?;
    }

    Ok(())
}
