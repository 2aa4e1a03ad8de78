use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid blob address: {0}")]
    InvalidBlobAddress(String),

    #[error("invalid artifact kind: {0}")]
    InvalidKind(String),
}
