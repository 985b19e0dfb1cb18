//! Stored record shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of the `type` field on every record the data endpoint writes
pub const WRITE_RECORD_TYPE: &str = "write";

/// A record written by the data endpoint. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub kind: String,
    /// Position within the request's write sequence
    pub index: i32,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// A `write` record stamped with the current time
    pub fn write(index: i32, payload: String) -> Self {
        Self {
            kind: WRITE_RECORD_TYPE.to_string(),
            index,
            payload,
            timestamp: Utc::now(),
        }
    }
}
