//! Error types for Letterlab stores.

use thiserror::Error;

/// Failures that reach the caller.
///
/// Decoding problems never show up here: a corrupt record is replaced by
/// its defaults at read time. Only the storage backend can fail a call.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// Short machine-readable tag, shown next to CLI error messages.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Backend(_) => "backend",
            StoreError::Sqlite(_) => "sqlite",
            StoreError::Io(_) => "io",
            StoreError::Encode(_) => "encode",
            StoreError::Join(_) => "join",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
