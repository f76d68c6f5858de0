//! Decision records.

use std::fmt;

use serde::{Deserialize, Serialize};

use mfm_types::{AttributeOperation, NodeOperation, SourceLocation};

/// What happened to an element or attribute at one merge step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Taken from the source that first declared it.
    Added,
    /// Combined with a declaration from another source.
    Merged,
    /// Lost against a higher priority declaration.
    Rejected,
    /// Written by a system property override rather than any source.
    Injected,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "ADDED",
            Self::Merged => "MERGED",
            Self::Rejected => "REJECTED",
            Self::Injected => "INJECTED",
        })
    }
}

/// One decision about an element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub action: ActionType,
    /// Where the declaration the decision is about was written.
    pub location: SourceLocation,
    /// The node instruction in effect, if explicit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<NodeOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl NodeRecord {
    pub fn new(action: ActionType, location: SourceLocation) -> Self {
        Self {
            action,
            location,
            operation: None,
            reason: None,
        }
    }

    pub fn with_operation(mut self, operation: Option<NodeOperation>) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// One decision about an attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub action: ActionType,
    pub location: SourceLocation,
    /// The attribute instruction in effect, if explicit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<AttributeOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AttributeRecord {
    pub fn new(action: ActionType, location: SourceLocation) -> Self {
        Self {
            action,
            location,
            operation: None,
            reason: None,
        }
    }

    pub fn with_operation(mut self, operation: Option<AttributeOperation>) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
