use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no UCP index at {0}")]
    IndexNotFound(std::path::PathBuf),

    #[error("passage count {passages} does not match embedding count {embeddings}")]
    LengthMismatch { passages: usize, embeddings: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "lancedb")]
    #[error("lancedb error: {0}")]
    Lance(#[from] ::lancedb::Error),

    #[cfg(feature = "lancedb")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("{0}")]
    Other(String),
}
