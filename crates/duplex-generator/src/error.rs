use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorServiceError {
    #[error("file not found: {file_id}")]
    FileNotFound { file_id: String },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] duplex_storage::error::StorageError),

    #[error(transparent)]
    Core(#[from] duplex_core::error::CoreError),
}
