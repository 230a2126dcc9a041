//! Error types for kanji_lookup

use thiserror::Error;

/// Errors raised while building characters, scoring them, or loading data
#[derive(Debug, Error)]
pub enum RecogError {
    /// A coordinate or derived value fell outside the 0-255 or 0-1 range
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Operation not valid in the current state (e.g. scoring before init)
    #[error("invalid state: {0}")]
    State(String),

    /// Caller passed something the operation cannot handle
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Algorithm selector not recognized
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Malformed compact stroke or direction summary
    #[error("invalid summary: {0}")]
    Summary(String),

    /// Invalid configuration values
    #[error("invalid config: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Repository snapshot could not be encoded or decoded
    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for recognition operations
pub type RecogResult<T> = Result<T, RecogError>;
