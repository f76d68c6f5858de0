use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Identifies the document an element came from (usually a file path).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Create a source identifier from any displayable path or name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The full identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Printable form; only the file name when `simple` is set.
    pub fn print(&self, simple: bool) -> &str {
        if simple {
            Path::new(&self.0)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&self.0)
        } else {
            &self.0
        }
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line and column of an element in its source document (1-based).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Position of content that does not exist in any source (injected).
    pub const UNKNOWN: Position = Position { line: 0, column: 0 };

    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns `true` for [`Position::UNKNOWN`].
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

/// A source document plus a position inside it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub source: SourceId,
    pub position: Position,
}

impl SourceLocation {
    pub fn new(source: SourceId, position: Position) -> Self {
        Self { source, position }
    }

    /// `source:line`, with the file name only when `simple` is set.
    pub fn print(&self, simple: bool) -> String {
        format!("{}:{}", self.source.print(simple), self.position.line)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.position.line)
    }
}
