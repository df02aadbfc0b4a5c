//! Error types for the chunk streaming pipeline

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chunk file error: {0}")]
    ChunkFile(String),

    #[error("Worker error: {0}")]
    Worker(String),
}
