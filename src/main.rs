//! conductor
//!
//! Runs the services described in a TOML file through the orchestrator and
//! shuts them down together on Ctrl-C, SIGTERM, a start failure, or the
//! configured run timeout.
//!
//! ```text
//!   config.toml ──▶ startup ──▶ Orchestrator ──┬──▶ Launcher(db)     ──▶ start … stop
//!                                              ├──▶ Launcher(cache)  ──▶ start … stop
//!                                              └──▶ Launcher(worker) ──▶ start … stop
//!                                                         ▲
//!                        SIGINT / SIGTERM / deadline ─────┘ shared shutdown signal
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use conductor::config::{apply_overrides, load_config, ConductorConfig, Overrides};
use conductor::lifecycle::{signals, startup};
use conductor::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "conductor")]
#[command(about = "Start a group of services together and stop them together", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop everything after this many seconds.
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Override the configured log level.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ConductorConfig::default(),
    };
    let config = apply_overrides(
        config,
        Overrides {
            run_timeout_secs: cli.timeout_secs,
            log_level: cli.log_level,
        },
    )?;

    logging::init_logging(&config.observability);
    tracing::info!("conductor v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let root = startup::root_signal(&config);
    tokio::spawn(signals::watch_signals(root.clone()));

    let orchestrator = startup::build_orchestrator(&config, &root);
    let shutdown = orchestrator.shutdown();
    let result = orchestrator.run().await;

    if let Some(reason) = shutdown.reason() {
        tracing::info!(reason = %reason, "Shutdown complete");
    }
    result?;
    Ok(())
}
