//! Liveness and readiness probes

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::{context::AppContext, errors::ApiError, errors::ApiResult};

/// Liveness probe endpoint
///
/// Always 200 while the process can serve HTTP. Never touches storage.
pub async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

/// Readiness probe endpoint
///
/// Fails immediately while storage is not connected; otherwise runs the
/// backend health command on every call.
pub async fn readiness_check(State(ctx): State<AppContext>) -> ApiResult<impl IntoResponse> {
    let store = ctx
        .storage
        .store()
        .ok_or_else(|| ApiError::NotReady("DB not connected".to_string()))?;

    if let Err(e) = store.ping().await {
        debug!(error = %e, "Readiness ping failed");
        return Err(ApiError::NotReady(e.to_string()));
    }

    Ok(Json(json!({
        "status": "ready",
        "timestamp": Utc::now(),
    })))
}
