//! Object-key conventions.
//!
//! Pure string functions — no AWS SDK dependency. These define the canonical
//! layout of persisted documents in the Duplex buckets.

use crate::models::request::RequestId;

/// Orchestrator-side request record.
pub fn request(id: &RequestId) -> String {
    format!("requests/{id}.json")
}

pub const REQUESTS_PREFIX: &str = "requests/";

/// Generator-side file record.
pub fn file_record(file_id: &str) -> String {
    format!("files/{file_id}.json")
}
