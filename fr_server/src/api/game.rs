//! Game API handlers.
//!
//! # Examples
//!
//! Spin with two bets and a client seed:
//! ```bash
//! curl -X POST http://localhost:3001/api/game/spin \
//!   -H "Content-Type: application/json" \
//!   -d '{"bets": [{"type": "straight", "numbers": [17], "amount": 10},
//!                 {"type": "red", "numbers": [1, 3, 5], "amount": 5}],
//!        "clientSeed": "my-seed"}'
//! ```
//!
//! Last five spins:
//! ```bash
//! curl "http://localhost:3001/api/game/history?limit=5"
//! ```

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use fair_roulette::{EngineError, FairnessCommitment, SpinResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{AppState, errors::ApiError};

#[derive(Debug, Serialize)]
pub struct SpinResponse {
    pub success: bool,
    pub result: SpinResult,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
}

/// Turn the raw `limit` query value into a history limit.
///
/// Unparseable values fall back to the engine default; values below 1 are
/// raised to 1.
fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let limit: i64 = raw?.trim().parse().ok()?;
    Some(usize::try_from(limit.max(1)).unwrap_or(usize::MAX))
}

/// GET /api/balance
pub async fn get_balance(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let balance = state.engine.balance().await?;
    Ok(Json(json!({ "balance": balance })))
}

/// POST /api/game/spin
///
/// Body: `{"bets": [...], "clientSeed"?: string}`. Bets are validated in
/// order and the first problem is reported.
pub async fn spin(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SpinResponse>, ApiError> {
    let Json(body) = body?;

    let client_seed = match body.get("clientSeed") {
        None | Some(Value::Null) => None,
        Some(Value::String(seed)) => Some(seed.as_str()),
        Some(_) => {
            return Err(
                EngineError::Validation("Client seed must be a string".to_string()).into(),
            );
        }
    };
    let bets = body.get("bets").unwrap_or(&Value::Null);

    let result = state.engine.process_spin_json(bets, client_seed).await?;

    Ok(Json(SpinResponse {
        success: true,
        result,
    }))
}

/// GET /api/game/history?limit=N
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let history = state
        .engine
        .history(parse_limit(query.limit.as_deref()))
        .await?;
    Ok(Json(json!({ "history": history })))
}

/// POST /api/game/reset
///
/// Also retires the server seed and discloses it under `revealedSeed`.
pub async fn reset(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let (balance, reveal) = state.engine.reset_and_reveal().await?;
    Ok(Json(json!({
        "success": true,
        "balance": balance,
        "revealedSeed": reveal,
    })))
}

/// GET /api/fairness
pub async fn get_fairness(
    State(state): State<AppState>,
) -> Result<Json<FairnessCommitment>, ApiError> {
    Ok(Json(state.engine.fairness()?))
}
