//! Pairwise merge of a lower priority document into a higher priority one.
//!
//! The result is a new document: the higher priority tree, extended with the
//! lower priority elements that survive. Neither input is modified.
//!
//! For every child of the lower priority element, in order:
//!
//! - kinds with the `ignore` policy are skipped;
//! - a same-kind `removeAll` marker on the higher side rejects it;
//! - with no same-identity element on the higher side it is adopted;
//! - a `replace`/`remove` instruction on the higher side rejects it;
//! - an explicit `merge` instruction or the `merge` policy merges both;
//! - otherwise both must be structurally equal (ignoring the attributes the
//!   higher side governs with `replace`/`remove`), or the child is abandoned
//!   with an error.

use tracing::debug;

use mfm_log::{ActionType, AttributeRecord, NodeRecord};
use mfm_model::{compare_nodes_ignoring, structurally_equal, Difference, Document, NodeId};
use mfm_types::{AttributeName, AttributeOperation, MergePolicy, NodeOperation};

use crate::config::ConflictMode;
use crate::recording::record_added_subtree;
use crate::report::MergeReportBuilder;

/// Marker for a merge stopped by an abandoned element.
#[derive(Debug)]
pub(crate) struct Abandoned;

/// Merge `low` under `high`.
///
/// Returns `None` when an element was abandoned under
/// [`ConflictMode::AbortMerge`]; the error is already in `report`.
pub fn merge_documents(
    high: &Document,
    low: &Document,
    report: &mut MergeReportBuilder,
    mode: ConflictMode,
) -> Option<Document> {
    record_added_subtree(high, high.root(), report.log());

    let mut step = PairwiseMerge {
        output: high.clone(),
        low,
        report,
        mode,
    };
    let (high_root, low_root) = (step.output.root(), low.root());
    match step.merge_children(high_root, low_root) {
        Ok(()) => Some(step.output),
        Err(Abandoned) => None,
    }
}

struct PairwiseMerge<'a> {
    output: Document,
    low: &'a Document,
    report: &'a mut MergeReportBuilder,
    mode: ConflictMode,
}

impl PairwiseMerge<'_> {
    fn merge_element(&mut self, high: NodeId, low: NodeId) -> Result<(), Abandoned> {
        self.merge_attributes(high, low);

        let low_node = self.low.node(low);
        let element = self.output.element_id(high);
        debug!(%element, from = %low_node.location(), "merging element");
        self.report.log().record_node(
            &element,
            NodeRecord::new(ActionType::Merged, low_node.location().clone())
                .with_operation(low_node.operation()),
        );
        self.merge_children(high, low)
    }

    fn merge_attributes(&mut self, high: NodeId, low: NodeId) {
        let low_doc = self.low;
        let low_node = low_doc.node(low);
        let low_location = low_node.location();
        let element = self.output.element_id(high);

        for attribute in low_node.attributes() {
            let name = attribute.name();
            let high_node = self.output.node(high);
            let high_location = high_node.location().clone();
            let high_operation = high_node.attribute_operation(name);
            let high_value = high_node.attribute_value(name).map(str::to_owned);
            let rejected = AttributeRecord::new(ActionType::Rejected, low_location.clone())
                .with_operation(high_operation);

            match high_value {
                None if high_operation == Some(AttributeOperation::Remove) => {
                    debug!(%element, attribute = %name, "attribute removed by instruction");
                    self.report.log().record_attribute(
                        &element,
                        name,
                        rejected.with_reason(format!("removed at {high_location}")),
                    );
                }
                None => {
                    self.output.set_attribute(high, name.clone(), attribute.value());
                    self.report.log().record_attribute(
                        &element,
                        name,
                        AttributeRecord::new(ActionType::Added, low_location.clone()),
                    );
                }
                Some(value) if value == attribute.value() => {}
                Some(value) => {
                    let collision = format!(
                        "attribute {element}@{name} value=({value}) from {high_location} \
                         is also present at {low_location} value=({})",
                        attribute.value()
                    );
                    match high_operation {
                        Some(AttributeOperation::Replace | AttributeOperation::Remove) => {}
                        Some(AttributeOperation::Strict) => {
                            self.report.add_error(
                                format!("{collision}, declared strict"),
                                Some(low_location.clone()),
                            );
                        }
                        None => {
                            self.report.add_warning(
                                format!(
                                    "{collision}, higher priority value kept; add tools:replace=\"{name}\" \
                                     at {high_location} to override"
                                ),
                                Some(low_location.clone()),
                            );
                        }
                    }
                    self.report.log().record_attribute(
                        &element,
                        name,
                        rejected.with_reason(format!("value ({value}) from {high_location} kept")),
                    );
                }
            }
        }
    }

    fn merge_children(&mut self, high: NodeId, low: NodeId) -> Result<(), Abandoned> {
        let low_doc = self.low;
        for &child in low_doc.children(low) {
            let kind = low_doc.node(child).kind();
            if kind.policy() == MergePolicy::Ignore {
                continue;
            }
            if let Some(marker) = self.removal_marker(high, child) {
                self.reject(marker, child, NodeOperation::RemoveAll);
                continue;
            }
            match self.counterpart(high, child) {
                None => self.adopt(high, child),
                Some(existing) => self.merge_matching(existing, child)?,
            }
        }
        Ok(())
    }

    /// A `removeAll` child of `high` with the same kind as `child`.
    fn removal_marker(&self, high: NodeId, child: NodeId) -> Option<NodeId> {
        let kind = self.low.node(child).kind();
        self.output.children(high).iter().copied().find(|candidate| {
            let node = self.output.node(*candidate);
            node.kind() == kind && node.operation() == Some(NodeOperation::RemoveAll)
        })
    }

    /// The child of `high` that `child` merges with: the first one with the
    /// same identity, preferring one that is structurally equal.
    fn counterpart(&self, high: NodeId, child: NodeId) -> Option<NodeId> {
        let low_node = self.low.node(child);
        let candidates: Vec<NodeId> = self
            .output
            .children(high)
            .iter()
            .copied()
            .filter(|candidate| self.output.node(*candidate).matches(low_node))
            .collect();
        candidates
            .iter()
            .copied()
            .find(|candidate| structurally_equal(&self.output, *candidate, self.low, child))
            .or_else(|| candidates.first().copied())
    }

    fn adopt(&mut self, high: NodeId, child: NodeId) {
        let copy = self.output.import_subtree(self.low, child, high);
        debug!(element = %self.output.element_id(copy), "adopted element");
        record_added_subtree(&self.output, copy, self.report.log());
    }

    fn reject(&mut self, winner: NodeId, loser: NodeId, operation: NodeOperation) {
        let winner_node = self.output.node(winner);
        let loser_location = self.low.node(loser).location().clone();
        let reason = format!("{operation} at {}", winner_node.location());
        let element = self.output.element_id(winner);
        debug!(%element, loser = %loser_location, %operation, "rejected lower priority element");
        self.report.log().record_node(
            &element,
            NodeRecord::new(ActionType::Rejected, loser_location.clone())
                .with_operation(Some(operation))
                .with_reason(reason.clone()),
        );
        // Removals by kind also leave a trace under the removed element's own id.
        let loser_element = self.low.element_id(loser);
        if loser_element != element {
            self.report.log().record_node(
                &loser_element,
                NodeRecord::new(ActionType::Rejected, loser_location)
                    .with_operation(Some(operation))
                    .with_reason(reason),
            );
        }
    }

    fn merge_matching(&mut self, existing: NodeId, child: NodeId) -> Result<(), Abandoned> {
        let high_node = self.output.node(existing);
        let operation = high_node.operation();
        let kind = high_node.kind();

        match operation {
            Some(op) if op.expects_rejection() => {
                self.reject(existing, child, op);
                Ok(())
            }
            Some(NodeOperation::Merge) => self.merge_element(existing, child),
            _ if kind.policy() == MergePolicy::Merge => self.merge_element(existing, child),
            _ => {
                let governed: Vec<AttributeName> = high_node
                    .attribute_operations()
                    .iter()
                    .filter(|(_, op)| op.expects_rejection())
                    .map(|(name, _)| name.clone())
                    .collect();
                match compare_nodes_ignoring(&self.output, existing, self.low, child, &governed) {
                    Ok(()) => self.merge_element(existing, child),
                    Err(difference) => self.abandon(existing, child, difference),
                }
            }
        }
    }

    fn abandon(
        &mut self,
        existing: NodeId,
        child: NodeId,
        difference: Difference,
    ) -> Result<(), Abandoned> {
        let element = self.output.element_id(existing);
        let high_location = self.output.node(existing).location().clone();
        let low_location = self.low.node(child).location().clone();
        debug!(%element, %difference, "element abandoned");

        self.report.add_error(
            format!(
                "{element} at {low_location} conflicts with the declaration at {high_location}, \
                 node abandoned: {difference}"
            ),
            Some(low_location.clone()),
        );
        self.report.log().record_node(
            &element,
            NodeRecord::new(ActionType::Rejected, low_location).with_reason(difference.to_string()),
        );
        match self.mode {
            ConflictMode::AbortMerge => Err(Abandoned),
            ConflictMode::SkipSubtree => Ok(()),
        }
    }
}
