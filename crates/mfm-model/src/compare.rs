//! Deep structural comparison of two elements.
//!
//! Attributes are compared both ways by name and value. Children are paired
//! by (kind, key); a child with no structurally equal partner on the other
//! side is a difference. Comments, positions and merge instructions never
//! take part.

use mfm_types::{AttributeName, SourceLocation};

use crate::document::Document;
use crate::kind::NodeKind;
use crate::node::{Node, NodeId};

/// The first difference found between two elements.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Difference {
    #[error("element <{left}> at {location} differs from <{right}>")]
    KindMismatch {
        left: NodeKind,
        right: NodeKind,
        location: SourceLocation,
    },

    #[error("attribute {attribute} declared at {declared_at} is missing at {missing_at}")]
    MissingAttribute {
        attribute: String,
        declared_at: SourceLocation,
        missing_at: SourceLocation,
    },

    #[error(
        "attribute {attribute} value=({left}) from {left_at} differs from value=({right}) at {right_at}"
    )]
    AttributeValue {
        attribute: String,
        left: String,
        left_at: SourceLocation,
        right: String,
        right_at: SourceLocation,
    },

    #[error("child {child} declared at {declared_at} has no equivalent at {missing_at}")]
    MissingChild {
        child: String,
        declared_at: SourceLocation,
        missing_at: SourceLocation,
    },

    #[error("element at {left_at} has {left} children, element at {right_at} has {right}")]
    ChildCount {
        left: usize,
        left_at: SourceLocation,
        right: usize,
        right_at: SourceLocation,
    },
}

/// Compare `left` in `left_doc` with `right` in `right_doc`.
pub fn compare_nodes(
    left_doc: &Document,
    left: NodeId,
    right_doc: &Document,
    right: NodeId,
) -> Result<(), Difference> {
    compare_nodes_ignoring(left_doc, left, right_doc, right, &[])
}

/// Like [`compare_nodes`], but the named attributes of the two top-level
/// elements are not compared. Children are compared in full.
pub fn compare_nodes_ignoring(
    left_doc: &Document,
    left: NodeId,
    right_doc: &Document,
    right: NodeId,
    ignored: &[AttributeName],
) -> Result<(), Difference> {
    let l = left_doc.node(left);
    let r = right_doc.node(right);
    if l.kind() != r.kind() {
        return Err(Difference::KindMismatch {
            left: l.kind(),
            right: r.kind(),
            location: l.location().clone(),
        });
    }

    compare_attributes(l, r, ignored)?;

    for child in l.children() {
        match_child(left_doc, *child, right_doc, r)?;
    }
    for child in r.children() {
        let node = right_doc.node(*child);
        if left_doc.find_child(left, node.kind(), node.key()).is_none() {
            return Err(missing_child(node, l));
        }
    }
    if l.children().len() != r.children().len() {
        return Err(Difference::ChildCount {
            left: l.children().len(),
            left_at: l.location().clone(),
            right: r.children().len(),
            right_at: r.location().clone(),
        });
    }
    Ok(())
}

/// Returns `true` if the two elements have no [`Difference`].
pub fn structurally_equal(
    left_doc: &Document,
    left: NodeId,
    right_doc: &Document,
    right: NodeId,
) -> bool {
    compare_nodes(left_doc, left, right_doc, right).is_ok()
}

fn compare_attributes(l: &Node, r: &Node, ignored: &[AttributeName]) -> Result<(), Difference> {
    let compared = |name: &AttributeName| !ignored.contains(name);
    for attribute in l.attributes().iter().filter(|a| compared(a.name())) {
        match r.attribute(attribute.name()) {
            None => {
                return Err(Difference::MissingAttribute {
                    attribute: attribute.name().to_string(),
                    declared_at: l.location().clone(),
                    missing_at: r.location().clone(),
                })
            }
            Some(other) if other.value() != attribute.value() => {
                return Err(Difference::AttributeValue {
                    attribute: attribute.name().to_string(),
                    left: attribute.value().to_string(),
                    left_at: l.location().clone(),
                    right: other.value().to_string(),
                    right_at: r.location().clone(),
                })
            }
            Some(_) => {}
        }
    }
    if let Some(extra) = r
        .attributes()
        .iter()
        .find(|a| compared(a.name()) && l.attribute(a.name()).is_none())
    {
        return Err(Difference::MissingAttribute {
            attribute: extra.name().to_string(),
            declared_at: r.location().clone(),
            missing_at: l.location().clone(),
        });
    }
    Ok(())
}

/// Find a structurally equal partner for `child` among the children of `parent`.
fn match_child(
    left_doc: &Document,
    child: NodeId,
    right_doc: &Document,
    parent: &Node,
) -> Result<(), Difference> {
    let node = left_doc.node(child);
    let mut first_difference = None;
    for candidate in parent.children() {
        if !right_doc.node(*candidate).matches(node) {
            continue;
        }
        match compare_nodes(left_doc, child, right_doc, *candidate) {
            Ok(()) => return Ok(()),
            Err(difference) => {
                first_difference.get_or_insert(difference);
            }
        }
    }
    Err(first_difference.unwrap_or_else(|| missing_child(node, parent)))
}

fn missing_child(child: &Node, parent: &Node) -> Difference {
    let name = match child.key() {
        Some(key) => format!("<{}> {key}", child.kind()),
        None => format!("<{}>", child.kind()),
    };
    Difference::MissingChild {
        child: name,
        declared_at: child.location().clone(),
        missing_at: parent.location().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawDocument, RawElement};

    fn doc(source: &str, child: RawElement) -> Document {
        Document::from_raw(&RawDocument::manifest(source, "com.example").child(child)).unwrap()
    }

    fn first_child(doc: &Document) -> NodeId {
        doc.children(doc.root())[0]
    }

    fn activity() -> RawElement {
        RawElement::new("activity")
            .android("name", ".Main")
            .android("label", "Main")
            .child(
                RawElement::new("intent-filter")
                    .child(RawElement::new("action").android("name", "android.intent.action.MAIN")),
            )
    }

    #[test]
    fn identical_subtrees_are_equal() {
        let a = doc("a.xml", activity());
        let b = doc("b.xml", activity().comment("ignored").tools("node", "strict"));
        assert!(structurally_equal(&a, first_child(&a), &b, first_child(&b)));
        assert!(structurally_equal(&b, first_child(&b), &a, first_child(&a)));
    }

    #[test]
    fn differing_value_is_reported() {
        let a = doc("a.xml", activity());
        let b = doc("b.xml", RawElement::new("activity").android("name", ".Main").android("label", "Other"));
        let diff = compare_nodes(&a, first_child(&a), &b, first_child(&b)).unwrap_err();
        match diff {
            Difference::AttributeValue { attribute, left, right, .. } => {
                assert_eq!(attribute, "android:label");
                assert_eq!(left, "Main");
                assert_eq!(right, "Other");
            }
            other => panic!("unexpected difference: {other}"),
        }
    }

    #[test]
    fn extra_attribute_on_either_side() {
        let a = doc("a.xml", RawElement::new("uses-permission").android("name", "p"));
        let b = doc(
            "b.xml",
            RawElement::new("uses-permission").android("name", "p").android("maxSdkVersion", "18"),
        );
        assert!(matches!(
            compare_nodes(&a, first_child(&a), &b, first_child(&b)),
            Err(Difference::MissingAttribute { .. })
        ));
        assert!(matches!(
            compare_nodes(&b, first_child(&b), &a, first_child(&a)),
            Err(Difference::MissingAttribute { .. })
        ));
    }

    #[test]
    fn missing_child_is_reported_both_ways() {
        let a = doc("a.xml", activity());
        let b = doc("b.xml", RawElement::new("activity").android("name", ".Main").android("label", "Main"));
        assert!(matches!(
            compare_nodes(&a, first_child(&a), &b, first_child(&b)),
            Err(Difference::MissingChild { .. })
        ));
        assert!(matches!(
            compare_nodes(&b, first_child(&b), &a, first_child(&a)),
            Err(Difference::MissingChild { .. })
        ));
    }

    #[test]
    fn keyless_children_pair_by_content() {
        let filters = |first: &str, second: &str| {
            RawElement::new("activity")
                .android("name", ".Main")
                .child(RawElement::new("intent-filter").child(RawElement::new("action").android("name", first)))
                .child(RawElement::new("intent-filter").child(RawElement::new("action").android("name", second)))
        };
        let a = doc("a.xml", filters("VIEW", "SEND"));
        let b = doc("b.xml", filters("SEND", "VIEW"));
        assert!(structurally_equal(&a, first_child(&a), &b, first_child(&b)));

        let c = doc("c.xml", filters("SEND", "EDIT"));
        assert!(!structurally_equal(&a, first_child(&a), &c, first_child(&c)));
    }

    #[test]
    fn ignored_attributes_are_skipped_at_top_level_only() {
        let a = doc("a.xml", activity());
        let b = doc(
            "b.xml",
            RawElement::new("activity")
                .android("name", ".Main")
                .android("label", "Other")
                .android("icon", "@drawable/i")
                .child(
                    RawElement::new("intent-filter")
                        .child(RawElement::new("action").android("name", "android.intent.action.MAIN")),
                ),
        );
        let ignored = [AttributeName::android("label"), AttributeName::android("icon")];
        assert!(compare_nodes_ignoring(&a, first_child(&a), &b, first_child(&b), &ignored).is_ok());
        assert!(compare_nodes(&a, first_child(&a), &b, first_child(&b)).is_err());
    }

    #[test]
    fn duplicate_children_change_the_count() {
        let single = RawElement::new("intent-filter").child(RawElement::new("category").android("name", "c"));
        let double = single.clone().child(RawElement::new("category").android("name", "c"));
        let a = doc("a.xml", single);
        let b = doc("b.xml", double);
        assert!(matches!(
            compare_nodes(&a, first_child(&a), &b, first_child(&b)),
            Err(Difference::ChildCount { left: 1, right: 2, .. })
        ));
    }
}
