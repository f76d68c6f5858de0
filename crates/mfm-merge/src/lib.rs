//! Merge engine for the manifest merger.
//!
//! A [`ManifestMerger`] loads a main document together with its libraries
//! and overlays, folds them from the highest priority document down, applies
//! system property overrides and validates the result. Every decision lands
//! in the provenance log of the returned [`MergeReport`].
//!
//! # Key Types
//!
//! - [`ManifestMerger`] -- the priority-ordered fold over all inputs
//! - [`MergerConfig`] / [`ConflictMode`] -- run configuration, loadable from TOML
//! - [`MergeReport`] / [`MergeReportBuilder`] / [`Message`] -- merge outcome
//! - [`SystemProperty`] -- build-time overrides
//! - [`merge_documents`] -- a single pairwise step
//! - [`validate`] -- post-merge checks

pub mod config;
pub mod error;
pub mod injector;
pub mod merge;
pub mod merger;
mod recording;
pub mod report;
pub mod validator;

pub use config::{ConflictMode, MergerConfig};
pub use error::{MergeError, MergeResult};
pub use injector::{inject, SystemProperty};
pub use merge::merge_documents;
pub use merger::ManifestMerger;
pub use report::{Message, MergeReport, MergeReportBuilder, ReportResult, ReportSummary};
pub use validator::validate;
