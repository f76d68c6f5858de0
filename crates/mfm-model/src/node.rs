//! Arena-backed elements and their attributes.

use std::fmt;
use std::sync::OnceLock;

use mfm_types::{AttributeName, AttributeOperation, NodeOperation, SourceLocation};

use crate::kind::NodeKind;

/// Stable index of a node inside its [`Document`](crate::Document) arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A single attribute. `owner` is a back-reference into the same arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: AttributeName,
    value: String,
    owner: NodeId,
}

impl Attribute {
    pub fn new(name: AttributeName, value: impl Into<String>, owner: NodeId) -> Self {
        Self {
            name,
            value: value.into(),
            owner,
        }
    }

    pub fn name(&self) -> &AttributeName {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }
}

/// One element of a document tree.
///
/// Merge instructions from the reserved namespace are held here rather than
/// among the attributes, so they never take part in structural comparison.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) operation: Option<NodeOperation>,
    pub(crate) attribute_operations: Vec<(AttributeName, AttributeOperation)>,
    pub(crate) comments: Vec<String>,
    pub(crate) location: SourceLocation,
    key: OnceLock<Option<String>>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeId>, location: SourceLocation) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            children: Vec::new(),
            parent,
            operation: None,
            attribute_operations: Vec::new(),
            comments: Vec::new(),
            location,
            key: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The identity key, resolved on first use and memoized.
    pub fn key(&self) -> Option<&str> {
        self.key
            .get_or_init(|| self.kind.key_resolver().resolve(&self.attributes))
            .as_deref()
    }

    /// Returns `true` if both nodes have the same (kind, key) identity.
    pub fn matches(&self, other: &Node) -> bool {
        self.kind == other.kind && self.key() == other.key()
    }

    /// The explicit node instruction, if one was declared.
    pub fn operation(&self) -> Option<NodeOperation> {
        self.operation
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &AttributeName) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Value of `name`, if present.
    pub fn attribute_value(&self, name: &AttributeName) -> Option<&str> {
        self.attribute(name).map(Attribute::value)
    }

    /// The attribute instruction declared for `name`, if any.
    pub fn attribute_operation(&self, name: &AttributeName) -> Option<AttributeOperation> {
        self.attribute_operations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, op)| *op)
    }

    pub fn attribute_operations(&self) -> &[(AttributeName, AttributeOperation)] {
        &self.attribute_operations
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Comments written immediately before this element.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub(crate) fn reset_key(&mut self) {
        self.key = OnceLock::new();
    }

    pub(crate) fn push_attribute(&mut self, name: AttributeName, value: String, owner: NodeId) {
        self.attributes.push(Attribute::new(name, value, owner));
    }

    pub(crate) fn set_attribute_value(&mut self, index: usize, value: String) -> String {
        std::mem::replace(&mut self.attributes[index].value, value)
    }
}
