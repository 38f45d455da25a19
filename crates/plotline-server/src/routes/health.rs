use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health` — liveness check.
///
/// Runs a trivial query against DuckDB and reports `200 OK` when it
/// succeeds, `503 Service Unavailable` when it does not (file locked,
/// disk full).
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage_ok = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check: DuckDB unreachable");
            false
        }
    };

    let code = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = Json(json!({
        "status": if storage_ok { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
    }));
    (code, body)
}
