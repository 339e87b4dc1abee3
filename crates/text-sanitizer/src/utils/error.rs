use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SanitizerError {
    #[error("Unable to read the file {0:?} with any of the attempted encodings")]
    UnreadableEncoding(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Chunk {chunk} failed after {attempts} attempts: {last_error}")]
    ChunkRetriesExhausted {
        chunk: usize,
        attempts: u32,
        last_error: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SanitizerError>;
