use duplex_core::models::artifact::ArtifactKind;
use duplex_core::models::request::RequestId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("request not found: {id}")]
    RequestNotFound { id: RequestId },

    #[error("artifact {kind} of request {id} is not completed")]
    ArtifactNotReady { id: RequestId, kind: ArtifactKind },

    #[error("completed {kind} artifact has no file descriptor")]
    MissingDescriptor { kind: ArtifactKind },

    #[error(transparent)]
    Store(#[from] duplex_store::error::StoreError),

    #[error(transparent)]
    Storage(#[from] duplex_storage::error::StorageError),

    #[error(transparent)]
    Bus(#[from] duplex_bus::error::BusError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Core(#[from] duplex_core::error::CoreError),
}

/// Failures from the generator RPC surface. These are absorbed at the
/// dispatch boundary and turned into failed reconciliations; they never
/// propagate out of a submission.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator request timed out: {0}")]
    Timeout(String),

    #[error("generator unreachable: {0}")]
    Http(String),

    #[error("generator returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed generator response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GeneratorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeneratorError::Timeout(e.to_string())
        } else if e.is_decode() {
            GeneratorError::Decode(e.to_string())
        } else {
            GeneratorError::Http(e.to_string())
        }
    }
}
