//! Merge policies and explicit merge instructions.
//!
//! A [`MergePolicy`] is fixed per element kind. Instructions are written by
//! authors in the reserved tools namespace: `tools:node="replace"` yields a
//! [`NodeOperation`], `tools:remove="android:label"` yields an
//! [`AttributeOperation`] applying to the listed attributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Kind-level default merge strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// At most one document may declare the element; a differing second
    /// declaration without instructions is an error.
    Conflict,
    /// Matching elements are always deep-merged.
    Merge,
    /// Follow the element's instruction; without one, behave as `strict`.
    RespectInstructions,
    /// The element is never matched or merged (document root).
    Ignore,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Conflict => "conflict",
            Self::Merge => "merge",
            Self::RespectInstructions => "respect-instructions",
            Self::Ignore => "ignore",
        };
        f.write_str(s)
    }
}

/// Instruction attached to an element through `tools:node`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeOperation {
    /// Deep-merge with the matching lower priority element.
    Merge,
    /// Matching declarations must be identical (the default).
    #[default]
    Strict,
    /// This declaration wins wholesale; the lower priority one is rejected.
    Replace,
    /// The matching lower priority declaration is dropped.
    Remove,
    /// All lower priority declarations of this kind are dropped.
    RemoveAll,
}

impl NodeOperation {
    /// Returns `true` for instructions that must reject at least one
    /// lower priority declaration to have had an effect.
    pub fn expects_rejection(&self) -> bool {
        matches!(self, Self::Replace | Self::Remove | Self::RemoveAll)
    }

    /// Returns `true` for `remove` and `remove-all`.
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Remove | Self::RemoveAll)
    }

    /// The keyword as written in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Strict => "strict",
            Self::Replace => "replace",
            Self::Remove => "remove",
            Self::RemoveAll => "removeAll",
        }
    }
}

impl FromStr for NodeOperation {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "merge" => Ok(Self::Merge),
            "strict" => Ok(Self::Strict),
            "replace" => Ok(Self::Replace),
            "remove" => Ok(Self::Remove),
            "removeAll" | "remove-all" => Ok(Self::RemoveAll),
            other => Err(TypeError::UnknownNodeOperation(other.to_string())),
        }
    }
}

impl fmt::Display for NodeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instruction governing how named attributes are reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeOperation {
    /// A lower priority declaration with another value is an error.
    /// Without an explicit instruction a collision is only a warning.
    #[default]
    Strict,
    /// The attribute is removed from all further merging.
    Remove,
    /// This value replaces lower priority values silently.
    Replace,
}

impl AttributeOperation {
    /// All keywords recognized as local names in the tools namespace.
    pub const KEYWORDS: [&'static str; 3] = ["remove", "replace", "strict"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Remove => "remove",
            Self::Replace => "replace",
        }
    }

    /// Returns `true` for instructions the post-merge validator checks.
    pub fn expects_rejection(&self) -> bool {
        matches!(self, Self::Remove | Self::Replace)
    }
}

impl FromStr for AttributeOperation {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "strict" => Ok(Self::Strict),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            other => Err(TypeError::UnknownAttributeOperation(other.to_string())),
        }
    }
}

impl fmt::Display for AttributeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
