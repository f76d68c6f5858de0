//! Foundation types for the manifest merger (MFM).
//!
//! This crate provides the vocabulary shared by every other MFM crate: the
//! merge policies and explicit merge instructions, namespace-aware attribute
//! names, source locations used in diagnostics, and the element identifiers
//! that key the provenance log.
//!
//! # Key Types
//!
//! - [`MergePolicy`] -- Kind-level default strategy (conflict / merge / respect-instructions / ignore)
//! - [`NodeOperation`] -- Per-element instruction parsed from the reserved `node` attribute
//! - [`AttributeOperation`] -- Per-attribute instruction (`remove`, `replace`, `strict`)
//! - [`AttributeName`] -- Plain or namespace-qualified attribute name
//! - [`SourceLocation`] -- Document identifier plus line/column
//! - [`ElementId`] -- Stable provenance key for an element
//! - [`Severity`] -- Info / warning / error classification for messages

pub mod element;
pub mod error;
pub mod location;
pub mod name;
pub mod operation;
pub mod severity;

pub use element::ElementId;
pub use error::TypeError;
pub use location::{Position, SourceId, SourceLocation};
pub use name::{AttributeName, ANDROID_PREFIX, ANDROID_URI, TOOLS_PREFIX, TOOLS_URI};
pub use operation::{AttributeOperation, MergePolicy, NodeOperation};
pub use severity::Severity;
