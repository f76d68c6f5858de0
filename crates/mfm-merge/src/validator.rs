//! Checks run once on the final merged document.
//!
//! 1. `<application>` is moved to be the last child of the root.
//! 2. Every `replace`/`remove`/`removeAll` instruction, on an element or an
//!    attribute, must have rejected at least one lower priority declaration.
//! 3. Attribute values are checked by the validators registered for the
//!    owning kind.
//! 4. Elements tagged `remove`/`removeAll` are dropped from the output.

use tracing::debug;

use mfm_log::ActionType;
use mfm_model::{Document, NodeKind};
use mfm_types::{AttributeOperation, NodeOperation};

use crate::report::{Message, MergeReportBuilder};

/// Run every post-merge check on `document`.
pub fn validate(document: &mut Document, report: &mut MergeReportBuilder) {
    reorder_application(document);
    check_instructions(document, report);
    check_values(document, report);
    strip_remove_markers(document);
}

fn reorder_application(document: &mut Document) {
    let root = document.root();
    if let Some(application) = document.find_child(root, NodeKind::Application, None) {
        document.move_to_end(application);
    }
}

fn check_instructions(document: &Document, report: &mut MergeReportBuilder) {
    for id in document.descendants(document.root()) {
        let node = document.node(id);
        let element = document.element_id(id);
        let location = node.location();

        if let Some(operation) = node.operation().filter(NodeOperation::expects_rejection) {
            if !report.log().has_node_action(&element, ActionType::Rejected) {
                let intent = match operation {
                    NodeOperation::Replace => "replace another declaration",
                    _ => "remove other declarations",
                };
                report.add_warning(
                    format!(
                        "{element} was tagged at {location} to {intent} but no other declaration \
                         present: instruction declared but had no effect"
                    ),
                    Some(location.clone()),
                );
            }
        }

        for (name, operation) in node.attribute_operations() {
            if !operation.expects_rejection()
                || report.log().has_attribute_action(&element, name, ActionType::Rejected)
            {
                continue;
            }
            let intent = match operation {
                AttributeOperation::Replace => "replace other declarations",
                _ => "remove other declarations",
            };
            report.add_warning(
                format!(
                    "{element}@{name} was tagged at {location} to {intent} but no other \
                     declaration present: instruction declared but had no effect"
                ),
                Some(location.clone()),
            );
        }
    }
}

fn check_values(document: &Document, report: &mut MergeReportBuilder) {
    for id in document.descendants(document.root()) {
        let node = document.node(id);
        for attribute in node.attributes() {
            let Some(validator) = node.kind().validator_for(attribute.name()) else {
                continue;
            };
            if let Some(issue) = validator(attribute.value()) {
                let element = document.element_id(id);
                report.add_message(Message::new(
                    issue.severity,
                    format!("{element}@{}: {}", attribute.name(), issue.message),
                    Some(node.location().clone()),
                ));
            }
        }
    }
}

fn strip_remove_markers(document: &mut Document) {
    for id in document.descendants(document.root()) {
        if document.node(id).operation().is_some_and(|op| op.is_removal()) {
            debug!(element = %document.element_id(id), "dropping removal marker");
            document.detach(id);
        }
    }
}
