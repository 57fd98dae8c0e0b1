//! fitpr daemon
//!
//! HTTP backend for trainer and client fitness management

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use eyre::WrapErr;
use fitpr_core::RateLimiter;
use tracing::{info, warn};

mod api;
mod config;
mod logging;
mod middleware;
mod pages;
mod router;
mod state;

use config::Config;
use state::AppState;

#[derive(Parser)]
#[command(name = "fitpr")]
#[command(about = "FitPr API server", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "FITPR_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to, overrides the config file
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let mut config = config.with_node_env(std::env::var("NODE_ENV").ok().as_deref());
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    logging::init(&config.server);
    info!(
        environment = %config.environment,
        clients = config.clients.len(),
        "fitpr starting"
    );

    let limiter = RateLimiter::in_memory();
    if config.rate_limit.enabled {
        spawn_purge(
            limiter.clone(),
            Duration::from_secs(config.rate_limit.purge_interval_secs.max(1)),
        );
    } else {
        warn!("rate limiting disabled");
    }

    let bind = config.server.bind.clone();
    let state = Arc::new(AppState::new(config, limiter));
    let app = router::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .wrap_err_with(|| format!("failed to bind {bind}"))?;
    info!(address = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("fitpr stopped");
    Ok(())
}

/// Periodically drop expired rate limit windows
fn spawn_purge(limiter: RateLimiter, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = limiter.purge_expired().await {
                warn!(error = %e, "rate limit purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
