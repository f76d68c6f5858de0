//! Error types for the merge engine.
//!
//! Only conditions that stop a merge before it starts are errors here.
//! Conflicts, dangling instructions and invalid values are messages on the
//! [`MergeReport`](crate::MergeReport).

use mfm_model::LoadError;
use mfm_types::SourceId;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// An input document could not be loaded.
    #[error("failed to load {document}: {cause}")]
    Load {
        document: SourceId,
        #[source]
        cause: LoadError,
    },

    /// A configuration file could not be read.
    #[error("failed to read configuration {path}: {cause}")]
    ConfigIo {
        path: String,
        #[source]
        cause: std::io::Error,
    },

    /// A configuration file is not valid TOML for [`MergerConfig`](crate::MergerConfig).
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A system property name or value is not recognized.
    #[error("unknown system property: {0}")]
    UnknownProperty(String),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
