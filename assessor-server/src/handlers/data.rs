//! Write-then-read data endpoint

use assessor_storage::{random_payload, Record, WRITE_RECORD_TYPE};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{context::AppContext, errors::ApiResult};

pub const WRITES_PER_REQUEST: usize = 5;
pub const READS_PER_REQUEST: usize = 5;

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub status: &'static str,
    /// Ids of the records inserted by this request, in insertion order
    pub writes: Vec<String>,
    /// Ids of whichever `write` records the lookups found; not necessarily
    /// this request's own
    pub reads: Vec<Option<String>>,
    pub timestamp: DateTime<Utc>,
}

/// Insert five records then run five lookups, strictly one after another.
///
/// The first storage error ends the request with a 500. Records already
/// inserted by this request stay in place.
pub async fn generate_data(State(ctx): State<AppContext>) -> ApiResult<Json<DataResponse>> {
    let store = ctx.storage.require_store()?;

    let mut writes = Vec::with_capacity(WRITES_PER_REQUEST);
    for index in 0..WRITES_PER_REQUEST {
        let record = Record::write(index as i32, random_payload(ctx.payload_size));
        writes.push(store.insert(&record).await?);
    }

    let mut reads = Vec::with_capacity(READS_PER_REQUEST);
    for _ in 0..READS_PER_REQUEST {
        reads.push(store.find_one_by_type(WRITE_RECORD_TYPE).await?);
    }

    Ok(Json(DataResponse {
        status: "success",
        writes,
        reads,
        timestamp: Utc::now(),
    }))
}
