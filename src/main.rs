//! # ChatRelay Daemon
//!
//! Drives the periodic task scheduler and keeps per-target chat history
//! trimmed to the configured limits.
//!
//! Usage:
//!   chatrelayd                           # Run until Ctrl-C
//!   chatrelayd --config ./relay.toml     # Explicit config file
//!   chatrelayd --ticks 40 -v             # Stop after 40 iterations, debug logging

mod daemon;

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use chatrelay_core::config::ChatRelayConfig;
use chatrelay_core::time::SystemClock;
use chatrelay_history::HistoryBackend;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::daemon::Daemon;

#[derive(Parser)]
#[command(
    name = "chatrelayd",
    version,
    about = "💬 ChatRelay: scheduler and chat history daemon"
)]
struct Cli {
    /// Config file (default: ~/.chatrelay/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Stop after this many loop iterations (0 = run until Ctrl-C)
    #[arg(long, default_value = "0")]
    ticks: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn expand_path(p: &str) -> String {
    shellexpand::tilde(p).to_string()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "chatrelayd=debug,chatrelay_scheduler=debug,chatrelay_history=debug"
    } else {
        "chatrelayd=info,chatrelay_scheduler=info,chatrelay_history=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => ChatRelayConfig::load_from(Path::new(&expand_path(path)))?,
        None => ChatRelayConfig::load()?,
    };

    tracing::info!("💬 ChatRelay starting as {}", config.server_name);
    tracing::info!(
        "   History: backend={}, max_lines={}, max_age={}s",
        config.history.backend,
        config.history.max_lines,
        config.history.max_age_secs
    );

    let mut daemon = Daemon::new(&config, Rc::new(SystemClock))?;
    let mut interval = tokio::time::interval(Duration::from_millis(config.scheduler.tick_ms));
    let mut iterations = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                daemon.tick();
                iterations += 1;
                if cli.ticks > 0 && iterations >= cli.ticks {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C received");
                break;
            }
        }
    }

    {
        let history = daemon.history();
        let store = history.borrow();
        tracing::info!(
            "📊 {} tasks scheduled, history holds {} lines across {} targets",
            daemon.scheduler().task_count(),
            store.total_lines(),
            store.object_count()
        );
    }
    daemon.shutdown();
    Ok(())
}
