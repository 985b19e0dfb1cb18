use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{context::AppContext, errors::ApiResult};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_documents: u64,
    pub timestamp: DateTime<Utc>,
}

/// Total number of stored records
pub async fn get_stats(State(ctx): State<AppContext>) -> ApiResult<Json<StatsResponse>> {
    let store = ctx.storage.require_store()?;
    let total_documents = store.count().await?;

    Ok(Json(StatsResponse {
        total_documents,
        timestamp: Utc::now(),
    }))
}
