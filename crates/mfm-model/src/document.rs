//! Documents: an arena of [`Node`]s rooted at a `<manifest>` element.

use std::collections::BTreeMap;

use tracing::debug;

use mfm_types::{
    AttributeName, AttributeOperation, ElementId, SourceId, SourceLocation, TOOLS_URI,
};

use crate::error::{ModelError, ModelResult};
use crate::kind::NodeKind;
use crate::node::{Attribute, Node, NodeId};
use crate::raw::{RawDocument, RawElement};

/// A loaded document.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Detached
/// nodes stay in the arena but are unreachable from the root.
#[derive(Clone, Debug)]
pub struct Document {
    source: SourceId,
    package: Option<String>,
    namespaces: BTreeMap<String, String>,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Interpret a parsed document.
    ///
    /// Resolves element kinds and namespace prefixes, moves reserved-namespace
    /// attributes into node and attribute instructions, and expands
    /// package-dependent class names with the declared package.
    pub fn from_raw(raw: &RawDocument) -> ModelResult<Self> {
        let mut namespaces = raw.namespaces.clone();
        collect_declarations(&raw.root, &mut namespaces);

        let package = raw
            .root
            .attributes
            .iter()
            .find(|a| a.name == "package")
            .map(|a| a.value.clone())
            .filter(|p| !p.is_empty());

        let mut builder = Builder {
            source: &raw.source,
            package: package.as_deref(),
            namespaces: &namespaces,
            nodes: Vec::new(),
        };
        let root = builder.build(&raw.root, None)?;
        let nodes = builder.nodes;
        debug!(source = %raw.source, nodes = nodes.len(), "document built");

        Ok(Self {
            source: raw.source.clone(),
            package,
            namespaces,
            nodes,
            root,
        })
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// The declared package, used for class-name expansion.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Prefix to URI bindings in scope for the document.
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// The first child of `parent` with the given identity.
    pub fn find_child(&self, parent: NodeId, kind: NodeKind, key: Option<&str>) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|child| {
            let node = self.node(*child);
            node.kind() == kind && node.key() == key
        })
    }

    /// Provenance id of a node; see [`ElementId`].
    pub fn element_id(&self, id: NodeId) -> ElementId {
        let node = self.node(id);
        let kind = node.kind().xml_name();
        let Some(parent) = node.parent() else {
            return ElementId::root(kind);
        };
        if let Some(key) = node.key() {
            return ElementId::keyed(kind, key);
        }
        let index = self
            .children(parent)
            .iter()
            .take_while(|sibling| **sibling != id)
            .filter(|sibling| self.node(**sibling).kind() == node.kind())
            .count();
        let parent_id = self
            .node(parent)
            .parent()
            .map(|_| self.element_id(parent));
        ElementId::keyless(parent_id.as_ref(), kind, index)
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// The first node of `kind` in document order.
    pub fn find_first(&self, kind: NodeKind) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.node(*id).kind() == kind)
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.descendants(self.root).len()
    }

    /// Deep-copy a subtree of `from` and append it as the last child of
    /// `parent`. Returns the id of the copy.
    pub fn import_subtree(&mut self, from: &Document, node: NodeId, parent: NodeId) -> NodeId {
        let id = self.copy_node(from, node, parent);
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn copy_node(&mut self, from: &Document, node: NodeId, parent: NodeId) -> NodeId {
        let original = from.node(node);
        let id = NodeId::from_index(self.nodes.len());
        let mut copy = original.clone();
        copy.parent = Some(parent);
        copy.children = Vec::new();
        copy.attributes = original
            .attributes()
            .iter()
            .map(|a| Attribute::new(a.name().clone(), a.value(), id))
            .collect();
        self.nodes.push(copy);

        let children = original
            .children()
            .iter()
            .map(|child| self.copy_node(from, *child, id))
            .collect();
        self.nodes[id.index()].children = children;
        id
    }

    /// Unlink `id` from its parent. The root cannot be detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).parent() else {
            return false;
        };
        let siblings = &mut self.nodes[parent.index()].children;
        let before = siblings.len();
        siblings.retain(|child| *child != id);
        siblings.len() != before
    }

    /// Move `id` to be the last child of its parent.
    pub fn move_to_end(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent() {
            let siblings = &mut self.nodes[parent.index()].children;
            siblings.retain(|child| *child != id);
            siblings.push(id);
        }
    }

    /// Set an attribute, returning the previous value.
    ///
    /// The value is stored as given; class-name expansion only happens when
    /// a document is built.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: AttributeName,
        value: impl Into<String>,
    ) -> Option<String> {
        let value = value.into();
        if id == self.root && name == AttributeName::plain("package") {
            self.package = Some(value.clone()).filter(|p| !p.is_empty());
        }
        let node = &mut self.nodes[id.index()];
        let previous = match node.attributes.iter().position(|a| a.name() == &name) {
            Some(index) => Some(node.set_attribute_value(index, value)),
            None => {
                node.push_attribute(name.clone(), value, id);
                None
            }
        };
        if node.kind().key_resolver().reads(&name) {
            node.reset_key();
        }
        previous
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &AttributeName) -> Option<Attribute> {
        let node = &mut self.nodes[id.index()];
        let index = node.attributes.iter().position(|a| a.name() == name)?;
        let removed = node.attributes.remove(index);
        if node.kind().key_resolver().reads(name) {
            node.reset_key();
        }
        Some(removed)
    }

    /// Create an empty element as the last child of `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        location: SourceLocation,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::new(kind, Some(parent), location));
        self.nodes[parent.index()].children.push(id);
        id
    }
}

/// Expand a shortened class name with `package`.
///
/// `.Foo` and `Foo` become `package.Foo`; names that already contain a dot
/// elsewhere are left alone, so expanding twice is a no-op.
pub fn expand_class_name(package: &str, value: &str) -> String {
    if package.is_empty() || value.is_empty() {
        value.to_string()
    } else if value.starts_with('.') {
        format!("{package}{value}")
    } else if !value.contains('.') {
        format!("{package}.{value}")
    } else {
        value.to_string()
    }
}

fn declared_prefix(name: &str) -> Option<&str> {
    name.strip_prefix("xmlns:")
}

fn is_declaration(name: &str) -> bool {
    name == "xmlns" || declared_prefix(name).is_some()
}

fn collect_declarations(element: &RawElement, namespaces: &mut BTreeMap<String, String>) {
    for attribute in &element.attributes {
        if let Some(prefix) = declared_prefix(&attribute.name) {
            namespaces.insert(prefix.to_string(), attribute.value.clone());
        }
    }
    for child in &element.children {
        collect_declarations(child, namespaces);
    }
}

struct Builder<'a> {
    source: &'a SourceId,
    package: Option<&'a str>,
    namespaces: &'a BTreeMap<String, String>,
    nodes: Vec<Node>,
}

impl Builder<'_> {
    fn build(&mut self, raw: &RawElement, parent: Option<NodeId>) -> ModelResult<NodeId> {
        let location = SourceLocation::new(self.source.clone(), raw.position);
        let kind = NodeKind::from_xml_name(&raw.name).ok_or_else(|| ModelError::UnknownElement {
            name: raw.name.clone(),
            location: Some(location.clone()),
        })?;
        // The manifest is the root and only the root.
        if (kind == NodeKind::Manifest) != parent.is_none() {
            return Err(ModelError::MisplacedElement {
                name: raw.name.clone(),
                location,
            });
        }

        let id = NodeId::from_index(self.nodes.len());
        let mut node = Node::new(kind, parent, location.clone());
        node.comments = raw.comments.clone();

        for attribute in &raw.attributes {
            if is_declaration(&attribute.name) {
                continue;
            }
            let name = self.resolve_name(&attribute.name, &location)?;
            if name.is_in_namespace(TOOLS_URI) {
                self.apply_instruction(&mut node, &name, &attribute.value, &location)?;
                continue;
            }
            if node.attribute(&name).is_some() {
                return Err(ModelError::DuplicateAttribute {
                    attribute: attribute.name.clone(),
                    location,
                });
            }
            let value = match self.package {
                Some(package) if kind.is_package_dependent(&name) => {
                    expand_class_name(package, &attribute.value)
                }
                _ => attribute.value.clone(),
            };
            node.push_attribute(name, value, id);
        }
        self.nodes.push(node);

        let mut children = Vec::with_capacity(raw.children.len());
        for child in &raw.children {
            children.push(self.build(child, Some(id))?);
        }
        self.nodes[id.index()].children = children;
        Ok(id)
    }

    fn resolve_name(&self, qualified: &str, location: &SourceLocation) -> ModelResult<AttributeName> {
        match qualified.split_once(':') {
            Some((prefix, local)) => {
                let uri = self
                    .namespaces
                    .get(prefix)
                    .ok_or_else(|| ModelError::UnboundPrefix {
                        prefix: prefix.to_string(),
                        location: location.clone(),
                    })?;
                Ok(AttributeName::namespaced(uri.as_str(), prefix, local))
            }
            None => Ok(AttributeName::plain(qualified)),
        }
    }

    fn apply_instruction(
        &self,
        node: &mut Node,
        name: &AttributeName,
        value: &str,
        location: &SourceLocation,
    ) -> ModelResult<()> {
        let invalid = |cause| ModelError::InvalidInstruction {
            location: location.clone(),
            cause,
        };
        match name.local() {
            "node" => {
                node.operation = Some(value.parse().map_err(invalid)?);
            }
            local if AttributeOperation::KEYWORDS.contains(&local) => {
                let operation: AttributeOperation = local.parse().map_err(invalid)?;
                for target in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                    let target = self.resolve_name(target, location)?;
                    node.attribute_operations.push((target, operation));
                }
            }
            other => {
                debug!(instruction = other, %location, "ignoring unsupported instruction");
            }
        }
        Ok(())
    }
}
