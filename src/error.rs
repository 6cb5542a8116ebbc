use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Conversion error: {0}")]
    Convert(String),
}

pub type Result<T> = std::result::Result<T, SidecarError>;
