//! HTTP API for the roulette engine.
//!
//! # Modules
//!
//! - [`game`]: Balance, spin, history, reset and fairness handlers
//! - [`errors`]: Uniform JSON error rendering
//! - [`request_id`]: Request ID propagation for log correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /api/balance             - Current balance
//! POST /api/game/spin           - Place bets and spin
//! GET  /api/game/history        - Recent spins, newest first (?limit=N)
//! POST /api/game/reset          - Restore the starting balance and reseed
//! GET  /api/fairness            - Current seed commitment and nonce
//! GET  /health                  - Health check
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use fair_roulette::{EngineConfig, RouletteEngine};
//! use fr_server::{api::{AppState, create_router}, config::ServerConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let state = AppState {
//!     engine: Arc::new(RouletteEngine::new(EngineConfig::default())),
//! };
//!
//! let app = create_router(state, &config);
//! let listener = tokio::net::TcpListener::bind(config.bind).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod game;
pub mod request_id;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use fair_roulette::RouletteEngine;
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use errors::ApiError;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to the Arc wrapper).
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RouletteEngine>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with the engine
/// - `config`: Server configuration (CORS origin, body limit)
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/balance", get(game::get_balance))
        .route("/game/spin", post(game::spin))
        .route("/game/history", get(game::get_history))
        .route("/game/reset", post(game::reset))
        .route("/fairness", get(game::get_fairness))
        .method_not_allowed_fallback(not_found);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(&config.cors_origin))
        .with_state(state)
}

/// CORS for the configured origin; `*` allows any.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    match HeaderValue::from_str(origin) {
        Ok(value) if origin != "*" => layer.allow_origin(value),
        _ => layer.allow_origin(Any),
    }
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(method, &uri)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the ledger worker answers and the outcome generator
/// is usable, `503 Service Unavailable` otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3001/health
/// # {"status":"healthy","version":"1.0.0","ledger":true,"rng":true,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let ledger_healthy = state.engine.balance().await.is_ok();
    let rng_healthy = state.engine.fairness().is_ok();
    let healthy = ledger_healthy && rng_healthy;

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "ledger": ledger_healthy,
        "rng": rng_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
