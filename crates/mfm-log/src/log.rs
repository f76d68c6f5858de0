//! The append-only provenance log.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use mfm_types::{AttributeName, ElementId};

use crate::error::LogResult;
use crate::record::{ActionType, AttributeRecord, NodeRecord};

/// Heading of [`ProvenanceLog::render`].
pub const RENDER_HEADER: &str = "-- Merging decision tree log ---";

/// Every decision recorded for one element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecisionTree {
    pub node_records: Vec<NodeRecord>,
    /// Attribute histories in first-recorded order.
    pub attributes: Vec<(AttributeName, Vec<AttributeRecord>)>,
}

impl DecisionTree {
    fn attribute_mut(&mut self, name: &AttributeName) -> &mut Vec<AttributeRecord> {
        let index = match self.attributes.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.attributes.push((name.clone(), Vec::new()));
                self.attributes.len() - 1
            }
        };
        &mut self.attributes[index].1
    }

    fn attribute(&self, name: &AttributeName) -> Option<&[AttributeRecord]> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }
}

#[derive(Default)]
struct LogState {
    order: Vec<ElementId>,
    entries: HashMap<ElementId, DecisionTree>,
}

impl LogState {
    fn entry(&mut self, element: &ElementId) -> &mut DecisionTree {
        if !self.entries.contains_key(element) {
            self.order.push(element.clone());
        }
        self.entries.entry(element.clone()).or_default()
    }
}

/// Audit trail of every merge decision, keyed by [`ElementId`].
///
/// Records are appended by the single merging thread; readers may inspect
/// the log concurrently through a shared reference.
pub struct ProvenanceLog {
    inner: RwLock<LogState>,
}

impl ProvenanceLog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LogState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LogState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LogState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a decision about an element.
    pub fn record_node(&self, element: &ElementId, record: NodeRecord) {
        debug!(%element, action = %record.action, location = %record.location, "node decision");
        self.write().entry(element).node_records.push(record);
    }

    /// Append a decision about one attribute of an element.
    pub fn record_attribute(&self, element: &ElementId, name: &AttributeName, record: AttributeRecord) {
        debug!(
            %element,
            attribute = %name,
            action = %record.action,
            location = %record.location,
            "attribute decision"
        );
        self.write().entry(element).attribute_mut(name).push(record);
    }

    /// Returns `true` if any node record exists for `element`.
    pub fn is_recorded(&self, element: &ElementId) -> bool {
        self.read()
            .entries
            .get(element)
            .is_some_and(|tree| !tree.node_records.is_empty())
    }

    pub fn node_records(&self, element: &ElementId) -> Vec<NodeRecord> {
        self.read()
            .entries
            .get(element)
            .map(|tree| tree.node_records.clone())
            .unwrap_or_default()
    }

    pub fn attribute_records(&self, element: &ElementId, name: &AttributeName) -> Vec<AttributeRecord> {
        self.read()
            .entries
            .get(element)
            .and_then(|tree| tree.attribute(name))
            .map(<[AttributeRecord]>::to_vec)
            .unwrap_or_default()
    }

    pub fn has_node_action(&self, element: &ElementId, action: ActionType) -> bool {
        self.read()
            .entries
            .get(element)
            .is_some_and(|tree| tree.node_records.iter().any(|r| r.action == action))
    }

    pub fn has_attribute_action(
        &self,
        element: &ElementId,
        name: &AttributeName,
        action: ActionType,
    ) -> bool {
        self.read()
            .entries
            .get(element)
            .and_then(|tree| tree.attribute(name))
            .is_some_and(|records| records.iter().any(|r| r.action == action))
    }

    /// Element ids in the order they were first recorded.
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.read().order.clone()
    }

    /// Number of elements with at least one record.
    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A serializable copy of the whole log, in recording order.
    pub fn snapshot(&self) -> LogSnapshot {
        let state = self.read();
        let elements = state
            .order
            .iter()
            .map(|element| {
                let tree = state.entries.get(element).cloned().unwrap_or_default();
                ElementEntry {
                    element: element.clone(),
                    records: tree.node_records,
                    attributes: tree
                        .attributes
                        .into_iter()
                        .map(|(name, records)| AttributeEntry {
                            name: name.to_string(),
                            records,
                        })
                        .collect(),
                }
            })
            .collect();
        LogSnapshot { elements }
    }

    /// Human-readable audit trail.
    ///
    /// With `simple_filenames`, locations show the file name only.
    pub fn render(&self, simple_filenames: bool) -> String {
        let state = self.read();
        let mut out = String::from(RENDER_HEADER);
        out.push('\n');
        for element in &state.order {
            let Some(tree) = state.entries.get(element) else {
                continue;
            };
            out.push_str(element.as_str());
            out.push('\n');
            for record in &tree.node_records {
                out.push_str(&format!(
                    "{} from {}\n",
                    record.action,
                    record.location.print(simple_filenames)
                ));
            }
            for (name, records) in &tree.attributes {
                out.push_str(&format!("\t{name}\n"));
                for record in records {
                    out.push_str(&format!(
                        "\t\t{} from {}\n",
                        record.action,
                        record.location.print(simple_filenames)
                    ));
                }
            }
        }
        out
    }
}

impl Default for ProvenanceLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProvenanceLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceLog")
            .field("elements", &self.len())
            .finish()
    }
}

/// Serializable form of a [`ProvenanceLog`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSnapshot {
    pub elements: Vec<ElementEntry>,
}

impl LogSnapshot {
    pub fn to_json(&self) -> LogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The entry for `element`, if recorded.
    pub fn element(&self, element: &ElementId) -> Option<&ElementEntry> {
        self.elements.iter().find(|e| &e.element == element)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementEntry {
    pub element: ElementId,
    pub records: Vec<NodeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Qualified name as printed, e.g. `android:label`.
    pub name: String,
    pub records: Vec<AttributeRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfm_types::{NodeOperation, Position, SourceId, SourceLocation};
    use std::sync::Arc;

    fn at(source: &str, line: u32) -> SourceLocation {
        SourceLocation::new(SourceId::new(source), Position::new(line, 5))
    }

    #[test]
    fn records_accumulate_in_order() {
        let log = ProvenanceLog::new();
        let activity = ElementId::keyed("activity", "com.example.A");
        log.record_node(&activity, NodeRecord::new(ActionType::Added, at("main.xml", 4)));
        log.record_node(&activity, NodeRecord::new(ActionType::Rejected, at("lib1.xml", 7)));
        log.record_node(&activity, NodeRecord::new(ActionType::Rejected, at("lib2.xml", 9)));

        let records = log.node_records(&activity);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].action, ActionType::Added);
        assert_eq!(records[2].location.source.as_str(), "lib2.xml");
        assert!(log.is_recorded(&activity));
        assert!(log.has_node_action(&activity, ActionType::Rejected));
        assert!(!log.has_node_action(&activity, ActionType::Merged));
    }

    #[test]
    fn attribute_records_are_keyed_by_name() {
        let log = ProvenanceLog::new();
        let app = ElementId::keyless(None, "application", 0);
        let label = AttributeName::android("label");
        log.record_attribute(&app, &label, AttributeRecord::new(ActionType::Added, at("main.xml", 3)));
        log.record_attribute(&app, &label, AttributeRecord::new(ActionType::Rejected, at("lib.xml", 2)));

        assert_eq!(log.attribute_records(&app, &label).len(), 2);
        assert!(log.has_attribute_action(&app, &label, ActionType::Rejected));
        assert!(!log.has_attribute_action(&app, &AttributeName::android("icon"), ActionType::Added));
        // Attribute-only entries do not count as node records.
        assert!(!log.is_recorded(&app));
    }

    #[test]
    fn element_ids_keep_first_recording_order() {
        let log = ProvenanceLog::new();
        let a = ElementId::root("manifest");
        let b = ElementId::keyed("uses-permission", "p");
        log.record_node(&b, NodeRecord::new(ActionType::Added, at("main.xml", 2)));
        log.record_node(&a, NodeRecord::new(ActionType::Added, at("main.xml", 1)));
        log.record_node(&b, NodeRecord::new(ActionType::Merged, at("lib.xml", 2)));
        assert_eq!(log.element_ids(), vec![b, a]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn render_lists_nodes_then_attributes() {
        let log = ProvenanceLog::new();
        let app = ElementId::keyless(None, "application", 0);
        log.record_node(&app, NodeRecord::new(ActionType::Added, at("app/main.xml", 3)));
        log.record_node(&app, NodeRecord::new(ActionType::Merged, at("lib/lib.xml", 2)));
        log.record_attribute(
            &app,
            &AttributeName::android("label"),
            AttributeRecord::new(ActionType::Added, at("app/main.xml", 3)),
        );

        let expected = "-- Merging decision tree log ---\n\
                        application[0]\n\
                        ADDED from main.xml:3\n\
                        MERGED from lib.xml:2\n\
                        \tandroid:label\n\
                        \t\tADDED from main.xml:3\n";
        assert_eq!(log.render(true), expected);
        assert!(log.render(false).contains("ADDED from app/main.xml:3"));
    }

    #[test]
    fn snapshot_serializes() {
        let log = ProvenanceLog::new();
        let activity = ElementId::keyed("activity", "A");
        log.record_node(
            &activity,
            NodeRecord::new(ActionType::Added, at("main.xml", 4)).with_operation(Some(NodeOperation::Replace)),
        );
        let snapshot = log.snapshot();
        assert_eq!(snapshot.element(&activity).unwrap().records.len(), 1);

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["elements"][0]["element"], "activity#A");
        assert_eq!(json["elements"][0]["records"][0]["action"], "added");
    }

    #[test]
    fn concurrent_readers_see_consistent_state() {
        let log = Arc::new(ProvenanceLog::new());
        let element = ElementId::keyed("permission", "p");
        for line in 0..50 {
            log.record_node(&element, NodeRecord::new(ActionType::Rejected, at("lib.xml", line)));
        }

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let log = Arc::clone(&log);
                let element = element.clone();
                std::thread::spawn(move || log.node_records(&element).len())
            })
            .collect();
        for reader in readers {
            assert_eq!(reader.join().unwrap(), 50);
        }
    }
}
