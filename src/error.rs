//! Engine error types.
//!
//! Asset failures are absorbed by the caller (logged, fallback rendering);
//! everything else is rejected at the call boundary. Nothing is retried.

use thiserror::Error;

/// Errors surfaced by the engine core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An image could not be fetched or decoded.
    #[error("failed to load asset '{path}': {reason}")]
    AssetLoad {
        /// Asset path as given in the manifest.
        path: String,
        /// Human readable cause.
        reason: String,
    },

    /// `generate` was called before initialization completed.
    #[error("world generator is not initialized")]
    GeneratorNotInitialized,

    /// Stamp data does not match the declared stamp dimensions.
    #[error("stamp size mismatch: expected {expected} tiles, got {actual}")]
    StampSizeMismatch {
        /// `width * height` of the stamp.
        expected: usize,
        /// Length of the provided tile data.
        actual: usize,
    },

    /// A persisted level could not be parsed or failed validation.
    #[error("malformed level: {0}")]
    MalformedLevel(String),

    /// Configuration file could not be read, parsed or written.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::MalformedLevel(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
