use mfm_log::{ActionType, AttributeRecord, NodeRecord, ProvenanceLog};
use mfm_model::{Document, NodeId};

/// Record every element and attribute under `node` as added from its own
/// location, unless a decision was already recorded for it.
pub(crate) fn record_added_subtree(document: &Document, node: NodeId, log: &ProvenanceLog) {
    for id in document.descendants(node) {
        let node = document.node(id);
        let element = document.element_id(id);
        if !log.is_recorded(&element) {
            log.record_node(
                &element,
                NodeRecord::new(ActionType::Added, node.location().clone())
                    .with_operation(node.operation()),
            );
        }
        for attribute in node.attributes() {
            let name = attribute.name();
            if log.attribute_records(&element, name).is_empty() {
                log.record_attribute(
                    &element,
                    name,
                    AttributeRecord::new(ActionType::Added, node.location().clone())
                        .with_operation(node.attribute_operation(name)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfm_model::{NodeKind, RawDocument, RawElement};
    use mfm_types::AttributeName;

    #[test]
    fn records_each_element_once() {
        let doc = Document::from_raw(
            &RawDocument::manifest("main.xml", "com.example").child(
                RawElement::new("application")
                    .at(3, 5)
                    .android("label", "App")
                    .child(RawElement::new("activity").at(4, 9).android("name", ".Main")),
            ),
        )
        .unwrap();
        let log = ProvenanceLog::new();
        record_added_subtree(&doc, doc.root(), &log);
        record_added_subtree(&doc, doc.root(), &log);

        assert_eq!(log.len(), 3);
        let activity = doc.element_id(doc.find_first(NodeKind::Activity).unwrap());
        let records = log.node_records(&activity);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, ActionType::Added);
        assert_eq!(records[0].location.position.line, 4);

        let app = doc.element_id(doc.find_first(NodeKind::Application).unwrap());
        assert_eq!(log.attribute_records(&app, &AttributeName::android("label")).len(), 1);
    }
}
