use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown node operation: {0}")]
    UnknownNodeOperation(String),

    #[error("unknown attribute operation: {0}")]
    UnknownAttributeOperation(String),
}
