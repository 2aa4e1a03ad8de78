use duplex_core::models::request::RequestId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request not found: {id}")]
    NotFound { id: RequestId },

    #[error("stale version for request {id}")]
    Conflict { id: RequestId },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] duplex_storage::error::StorageError),
}
