//! Top-level entry point: load every input, fold them by priority, then
//! inject overrides and validate.

use tracing::{debug, info};

use mfm_model::{Document, DocumentLoader};
use mfm_types::SourceId;

use crate::config::MergerConfig;
use crate::error::{MergeError, MergeResult};
use crate::injector::inject;
use crate::merge::merge_documents;
use crate::recording::record_added_subtree;
use crate::report::{MergeReport, MergeReportBuilder};
use crate::validator::validate;

/// Merges a main document with its libraries and overlays.
///
/// Priority, highest first: overlays in the order they were added, the main
/// document, then libraries in the order they were added.
#[derive(Clone, Debug)]
pub struct ManifestMerger {
    main: SourceId,
    libraries: Vec<SourceId>,
    overlays: Vec<SourceId>,
    config: MergerConfig,
}

impl ManifestMerger {
    pub fn new(main: impl Into<SourceId>) -> Self {
        Self {
            main: main.into(),
            libraries: Vec::new(),
            overlays: Vec::new(),
            config: MergerConfig::default(),
        }
    }

    /// Add a library document. Earlier libraries outrank later ones.
    pub fn add_library(mut self, library: impl Into<SourceId>) -> Self {
        self.libraries.push(library.into());
        self
    }

    /// Add a flavor or build-type overlay. Earlier overlays outrank later ones.
    pub fn add_overlay(mut self, overlay: impl Into<SourceId>) -> Self {
        self.overlays.push(overlay.into());
        self
    }

    pub fn with_config(mut self, config: MergerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    /// Every input, from lowest to highest priority.
    pub fn priority_order(&self) -> Vec<SourceId> {
        self.libraries
            .iter()
            .rev()
            .chain(std::iter::once(&self.main))
            .chain(self.overlays.iter().rev())
            .cloned()
            .collect()
    }

    /// Run the merge.
    ///
    /// Only a document that fails to load is an `Err`. Conflicts and other
    /// problems are messages on the returned report, whose result says
    /// whether a merged document was produced.
    ///
    /// Documents accumulate highest priority first, so intermediary stages
    /// start from the top overlay (or the main document) and grow downward.
    pub fn merge(&self, loader: &dyn DocumentLoader) -> MergeResult<MergeReport> {
        let mut documents = self
            .priority_order()
            .into_iter()
            .map(|source| {
                loader
                    .load(&source)
                    .map_err(|cause| MergeError::Load { document: source, cause })
            })
            .collect::<MergeResult<Vec<Document>>>()?;

        let mut report = MergeReportBuilder::new();
        let Some(mut merged) = documents.pop() else {
            return Ok(report.build(None));
        };
        info!(source = %merged.source(), "merging highest priority document");
        record_added_subtree(&merged, merged.root(), report.log());
        self.keep_stage(&merged, &mut report);

        for (remaining, low) in documents.iter().enumerate().rev() {
            info!(source = %low.source(), "merging lower priority document");
            match merge_documents(&merged, low, &mut report, self.config.on_conflict) {
                Some(next) => merged = next,
                None => {
                    info!(source = %low.source(), "merge aborted");
                    report.add_info(
                        format!(
                            "merge stopped at {}; {remaining} lower priority document(s) not merged",
                            low.source()
                        ),
                        None,
                    );
                    return Ok(report.build(None));
                }
            }
            self.keep_stage(&merged, &mut report);
        }

        inject(&mut merged, &self.config.overrides, report.log());
        validate(&mut merged, &mut report);
        debug!(nodes = merged.node_count(), "merge finished");
        Ok(report.build(Some(merged)))
    }

    fn keep_stage(&self, document: &Document, report: &mut MergeReportBuilder) {
        if self.config.keep_intermediary_stages {
            report.add_intermediary_stage(document.to_xml());
        }
    }
}
