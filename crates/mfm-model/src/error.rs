//! Error types for the document model.

use mfm_types::{SourceId, SourceLocation, TypeError};

/// Errors raised while constructing a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// An element name has no entry in the kind table.
    #[error("unknown element <{name}>{}", at(.location))]
    UnknownElement {
        name: String,
        location: Option<SourceLocation>,
    },

    /// The document root is not a `<manifest>` element, or a `<manifest>`
    /// element appears below the root.
    #[error("misplaced element <{name}> at {location}")]
    MisplacedElement {
        name: String,
        location: SourceLocation,
    },

    /// The same attribute is declared twice on one element.
    #[error("duplicate attribute {attribute} at {location}")]
    DuplicateAttribute {
        attribute: String,
        location: SourceLocation,
    },

    /// An attribute uses a prefix with no namespace declaration.
    #[error("unbound namespace prefix {prefix:?} at {location}")]
    UnboundPrefix {
        prefix: String,
        location: SourceLocation,
    },

    /// A reserved-namespace instruction could not be parsed.
    #[error("invalid merge instruction at {location}: {cause}")]
    InvalidInstruction {
        location: SourceLocation,
        #[source]
        cause: TypeError,
    },
}

fn at(location: &Option<SourceLocation>) -> String {
    match location {
        Some(location) => format!(" at {location}"),
        None => String::new(),
    }
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by a [`DocumentLoader`](crate::DocumentLoader).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No document is registered under the requested source.
    #[error("document not found: {0}")]
    NotFound(SourceId),

    /// The source could not be read.
    #[error("io error reading {source_id}: {cause}")]
    Io {
        source_id: SourceId,
        #[source]
        cause: std::io::Error,
    },

    /// The source text is malformed.
    #[error("parse error in {source_id}: {message}")]
    Parse { source_id: SourceId, message: String },

    /// The parsed tree violates the document model.
    #[error(transparent)]
    Model(#[from] ModelError),
}
