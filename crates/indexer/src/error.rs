use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] mooddine_vector_store::VectorStoreError),

    #[error("Invalid images path: {0}")]
    InvalidPath(String),

    #[error("Manifest line {line}: {message}")]
    Manifest { line: usize, message: String },

    #[error("{0}")]
    Other(String),
}
