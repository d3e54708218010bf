use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty embedding for record '{locator}'")]
    EmptyEmbedding { locator: String },

    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Corrupt index artifact: {0}")]
    CorruptIndex(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
