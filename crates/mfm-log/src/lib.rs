//! Provenance log for the manifest merger.
//!
//! Every decision the merger takes is appended here, keyed by the
//! [`ElementId`](mfm_types::ElementId) of the element concerned: which
//! source added it, which sources merged into it, which declarations were
//! rejected and what was injected afterwards. The post-merge validator reads
//! the same log to check that explicit instructions had an effect.
//!
//! # Key Types
//!
//! - [`ProvenanceLog`] -- the append-only log
//! - [`NodeRecord`] / [`AttributeRecord`] / [`ActionType`] -- single decisions
//! - [`LogSnapshot`] -- serializable copy for reporting

pub mod error;
pub mod log;
pub mod record;

pub use error::{LogError, LogResult};
pub use log::{AttributeEntry, DecisionTree, ElementEntry, LogSnapshot, ProvenanceLog, RENDER_HEADER};
pub use record::{ActionType, AttributeRecord, NodeRecord};
