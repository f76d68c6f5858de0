//! Document tree model for the manifest merger.
//!
//! Documents are arenas of [`Node`]s addressed by [`NodeId`]. Every element
//! has a [`NodeKind`] from a closed table that fixes its merge policy, how
//! its identity key is resolved, which attributes hold package-relative class
//! names, and which attribute values are validated.
//!
//! # Key Types
//!
//! - [`Document`] / [`Node`] / [`Attribute`] -- the loaded tree
//! - [`NodeKind`] / [`KindDescriptor`] -- the kind table
//! - [`KeyResolver`] -- per-kind identity keys
//! - [`RawDocument`] / [`RawElement`] -- parser output and JSON interchange form
//! - [`DocumentLoader`] -- loading seam, with [`InMemoryLoader`] and [`JsonFileLoader`]
//! - [`Difference`] -- result of [`compare_nodes`]

pub mod compare;
pub mod document;
pub mod error;
pub mod key;
pub mod kind;
pub mod loader;
pub mod node;
pub mod raw;
pub mod validate;
mod writer;

pub use compare::{compare_nodes, compare_nodes_ignoring, structurally_equal, Difference};
pub use document::{expand_class_name, Document};
pub use error::{LoadError, ModelError, ModelResult};
pub use key::KeyResolver;
pub use kind::{KindDescriptor, NodeKind};
pub use loader::{DocumentLoader, InMemoryLoader, JsonFileLoader};
pub use node::{Attribute, Node, NodeId};
pub use raw::{default_namespaces, RawAttribute, RawDocument, RawElement};
pub use validate::{AttributeValidator, ValidationIssue};
