#![forbid(unsafe_code)]

use clap::Parser;
use honeypot_ratelimit_lib::config::load_from_path;
use honeypot_ratelimit_lib::telemetry::{init_metrics, init_tracing, start_observability_server};
use honeypot_ratelimit_lib::{Config, RateLimitError, RateLimiter, TickDriver};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Honeypot admission-control rate limiter")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "HONEYPOT_RATELIMIT_CONFIG",
        default_value = "config/ratelimit.toml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(&cfg.logging, &cfg.telemetry.otel_log_level) {
        eprintln!("failed to initialise tracing: {err}");
        std::process::exit(1);
    }

    if let Err(err) = run(cfg).await {
        error!(%err, "rate limiter exited with error");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<(), RateLimitError> {
    let (metrics, registry) = init_metrics()?;
    let limiter = Arc::new(RateLimiter::from_config(&cfg.rate_limit, metrics)?);

    info!(
        window_secs = cfg.rate_limit.window_seconds,
        slot_secs = cfg.rate_limit.slot_seconds,
        slots = limiter.identity().slots(),
        "rate limiter configured"
    );

    let ticks = TickDriver::start(limiter.clone(), limiter.slot_duration());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let observability = cfg.telemetry.metrics_port.map(|port| {
        let ticking = ticks.running_flag();
        tokio::spawn(async move {
            if let Err(e) = start_observability_server(port, registry, ticking, shutdown_rx).await {
                error!(error = %e, "observability server failed");
            }
        })
    });

    wait_for_shutdown().await?;

    if shutdown_tx.send(true).is_err() {
        warn!("observability server already stopped");
    }
    ticks.stop().await;
    if let Some(handle) = observability {
        if let Err(e) = handle.await {
            warn!(error = %e, "observability server task failed");
        }
    }

    info!("shutdown complete");
    Ok(())
}

async fn wait_for_shutdown() -> Result<(), RateLimitError> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|e| {
        RateLimitError::Io(std::io::Error::other(format!("Failed to setup SIGTERM handler: {e}")))
    })?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).map_err(|e| {
        RateLimitError::Io(std::io::Error::other(format!("Failed to setup SIGINT handler: {e}")))
    })?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("Received SIGINT, shutting down"),
    }
    Ok(())
}
