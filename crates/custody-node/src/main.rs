//! # Custody Node
//!
//! Entry point for the custody ledger host.
//!
//! ```text
//! custody-node --admin 0x…ad run --script ops.jsonl --snapshot-out state.json
//! custody-node --snapshot-in state.json run --script more.jsonl
//! custody-node demo
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use custody_node::{init_logging, read_snapshot, run_demo, run_script, write_snapshot};
use custody_registry::prelude::*;
use shared_bus::{EventFilter, InMemoryEventBus};

/// Custody Node: product custody ledger host
#[derive(Parser, Debug)]
#[command(name = "custody-node", version)]
#[command(about = "Runs custody ledger operations from scripts or a demo scenario")]
struct Args {
    /// Admin identity (overrides CUSTODY_ADMIN)
    #[arg(long, global = true)]
    admin: Option<Identity>,

    /// Identities authorized at start-up, comma separated (overrides CUSTODY_AUTHORIZED)
    #[arg(long, global = true, value_delimiter = ',')]
    authorized: Vec<Identity>,

    /// Restore state from this snapshot before running
    #[arg(long, global = true)]
    snapshot_in: Option<PathBuf>,

    /// Write the final state to this snapshot
    #[arg(long, global = true)]
    snapshot_out: Option<PathBuf>,

    /// Log level filter (overrides CUSTODY_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a JSON-lines script of operations
    Run {
        /// Script file, one operation per line
        #[arg(long)]
        script: PathBuf,
    },
    /// Run the built-in widget scenario
    ///
    /// Uses fixed principals on a fresh registry. Only --log-level and
    /// --json-logs apply; CUSTODY_* variables and the admin, authorized and
    /// snapshot flags are ignored.
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match &args.command {
        Commands::Demo => {
            // The demo runs on fixed principals, so only the log flags apply.
            let (level, json_logs) = demo_log_settings(&args);
            init_logging(&level, json_logs)?;
            info!(version = custody_registry::VERSION, "Starting custody node demo");
            demo().await
        }
        Commands::Run { script } => {
            let config = load_config(&args)?;
            init_logging(&config.log_level, config.json_logs)?;
            info!(version = custody_registry::VERSION, "Starting custody node");
            run(&args, &config, script).await
        }
    }
}

/// Log settings for the demo, from CLI flags and built-in defaults only.
fn demo_log_settings(args: &Args) -> (String, bool) {
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| RegistryConfig::default().log_level);
    (level, args.json_logs)
}

/// Environment configuration with CLI flags layered on top.
fn load_config(args: &Args) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::from_env().context("loading configuration")?;
    if let Some(admin) = args.admin {
        config.admin = admin;
    }
    if !args.authorized.is_empty() {
        config.authorized = args.authorized.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config.json_logs |= args.json_logs;
    Ok(config)
}

async fn demo() -> Result<()> {
    let report = run_demo().await?;
    for outcome in &report.outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }
    for event in &report.events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

async fn run(args: &Args, config: &RegistryConfig, script_path: &Path) -> Result<()> {
    let script = std::fs::read_to_string(script_path)
        .with_context(|| format!("reading script {}", script_path.display()))?;

    let bus = Arc::new(InMemoryEventBus::with_capacity(config.event_capacity));
    let watcher = spawn_event_watcher(&bus);
    let sink = BusEventSink::new(bus);
    let service = match &args.snapshot_in {
        Some(path) => {
            let snapshot = read_snapshot(path)?;
            // Never stamp history earlier than what the snapshot already holds.
            let clock = SystemTimeSource::starting_at(snapshot.latest_timestamp());
            CustodyService::from_snapshot(snapshot, clock, sink)
                .with_context(|| format!("restoring snapshot {}", path.display()))?
        }
        None => {
            config.validate().context("invalid configuration")?;
            CustodyService::from_config(config, SystemTimeSource::new(), sink)
                .context("initialising registry")?
        }
    };

    let outcomes = run_script(&service, &script).await;
    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }

    let stats = service.stats().await;
    info!(
        operations = outcomes.len(),
        registrations = stats.registrations,
        transfers = stats.transfers,
        status_updates = stats.status_updates,
        rejected = stats.rejected_calls,
        "Script finished"
    );

    if let Some(path) = &args.snapshot_out {
        write_snapshot(path, &service.snapshot().await)?;
        info!(path = %path.display(), "Snapshot written");
    }

    drop(service);
    watcher.await.context("joining event watcher")?;
    Ok(())
}

/// Log every notification published on the bus until it closes.
fn spawn_event_watcher(bus: &InMemoryEventBus) -> tokio::task::JoinHandle<()> {
    let mut subscription = bus.subscribe(EventFilter::all());
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            debug!(kind = event.kind(), id = %event.product_id(), "Notification");
        }
    })
}
