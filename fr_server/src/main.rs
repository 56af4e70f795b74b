//! Roulette server exposing the spin engine over HTTP.
//!
//! A single engine instance (one ledger actor, one outcome generator) is
//! shared by every request.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use fair_roulette::RouletteEngine;
use fr_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging,
};
use log::info;
use pico_args::Arguments;
use tokio::sync::Notify;

const HELP: &str = "\
Run a provably fair roulette server

USAGE:
  fr_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:$PORT]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:3001)
  PORT                     Port on 127.0.0.1 when SERVER_BIND is unset [default: 3001]
  CORS_ORIGIN              Allowed CORS origin [default: *]
  BODY_LIMIT_BYTES         Maximum request body size [default: 10240]
  INITIAL_BALANCE          Starting balance [default: 1000]
  MAX_HISTORY_LIMIT        Ceiling for one history read [default: 100]
  DEFAULT_HISTORY_LIMIT    History limit when none is given [default: 10]
  HISTORY_RETENTION        History entries kept in memory [default: 10000]
  SPIN_ISOLATION           atomic or legacy [default: atomic]
  LEDGER_QUEUE_CAPACITY    Ledger inbox size [default: 100]
  RUST_LOG                 Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;

    logging::init();

    let config = ServerConfig::from_env(bind)?;
    config.validate()?;

    // Ctrl-C and SIGTERM trigger a graceful shutdown.
    let shutdown = Arc::new(Notify::new());
    let notify = Arc::clone(&shutdown);
    ctrlc::set_handler(move || notify.notify_one())?;

    let engine = Arc::new(RouletteEngine::new(config.engine.clone()));
    let state = AppState {
        engine: Arc::clone(&engine),
    };
    let app = api::create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Roulette server is running at http://{} (isolation: {}). Press Ctrl+C to stop.",
        config.bind, config.engine.isolation
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    match engine.balance().await {
        Ok(balance) => info!("Final balance: {balance}"),
        Err(e) => log::warn!("Could not read final balance: {e}"),
    }

    Ok(())
}
