//! Error types for the schema model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Duplicate schema file: {0}")]
    DuplicateFile(String),

    #[error("File to generate not found in request: {0}")]
    UnknownFileToGenerate(String),

    #[error("Schema file {file} imports unknown file {import}")]
    UnresolvedImport { file: String, import: String },

    #[error("Invalid schema file {file}: {message}")]
    InvalidFile { file: String, message: String },

    #[error("Frame too large: {len} bytes (limit {limit})")]
    FrameTooLarge { len: usize, limit: usize },

    #[error("Truncated frame: expected {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
