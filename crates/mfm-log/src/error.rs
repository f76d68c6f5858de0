//! Error types for the provenance log.

/// Errors that can occur when exporting the log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The snapshot could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for log results.
pub type LogResult<T> = Result<T, LogError>;
