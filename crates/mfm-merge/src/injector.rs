//! System property overrides applied to the merged document.
//!
//! Overrides come from the build rather than from any source document, so
//! every attribute they write is logged as [`ActionType::Injected`]. A
//! missing `<uses-sdk>` is created when an SDK level is overridden.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use mfm_log::{ActionType, AttributeRecord, NodeRecord, ProvenanceLog};
use mfm_model::{Document, NodeId, NodeKind};
use mfm_types::{AttributeName, Position, SourceLocation};

use crate::error::MergeError;

/// A property the build may force onto the merged document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemProperty {
    /// `package` on the root.
    Package,
    /// `android:versionCode` on the root.
    VersionCode,
    /// `android:versionName` on the root.
    VersionName,
    /// `android:minSdkVersion` on `<uses-sdk>`.
    MinSdkVersion,
    /// `android:targetSdkVersion` on `<uses-sdk>`.
    TargetSdkVersion,
}

impl SystemProperty {
    pub const ALL: [SystemProperty; 5] = [
        Self::Package,
        Self::VersionCode,
        Self::VersionName,
        Self::MinSdkVersion,
        Self::TargetSdkVersion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::VersionCode => "version_code",
            Self::VersionName => "version_name",
            Self::MinSdkVersion => "min_sdk_version",
            Self::TargetSdkVersion => "target_sdk_version",
        }
    }

    /// The attribute this property writes.
    pub fn attribute(&self) -> AttributeName {
        match self {
            Self::Package => AttributeName::plain("package"),
            Self::VersionCode => AttributeName::android("versionCode"),
            Self::VersionName => AttributeName::android("versionName"),
            Self::MinSdkVersion => AttributeName::android("minSdkVersion"),
            Self::TargetSdkVersion => AttributeName::android("targetSdkVersion"),
        }
    }

    /// The element kind carrying the attribute.
    pub fn target(&self) -> NodeKind {
        match self {
            Self::Package | Self::VersionCode | Self::VersionName => NodeKind::Manifest,
            Self::MinSdkVersion | Self::TargetSdkVersion => NodeKind::UsesSdk,
        }
    }
}

impl FromStr for SystemProperty {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| MergeError::UnknownProperty(s.to_string()))
    }
}

impl fmt::Display for SystemProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write every override into `document`, logging each write.
pub fn inject(
    document: &mut Document,
    overrides: &BTreeMap<SystemProperty, String>,
    log: &ProvenanceLog,
) {
    let location = SourceLocation::new(document.source().clone(), Position::UNKNOWN);
    for (property, value) in overrides {
        let target = match property.target() {
            NodeKind::Manifest => document.root(),
            kind => find_or_create(document, kind, &location, log),
        };
        let name = property.attribute();
        let previous = document.set_attribute(target, name.clone(), value.as_str());
        debug!(%property, %value, ?previous, "injected system property");
        log.record_attribute(
            &document.element_id(target),
            &name,
            AttributeRecord::new(ActionType::Injected, location.clone()),
        );
    }
}

fn find_or_create(
    document: &mut Document,
    kind: NodeKind,
    location: &SourceLocation,
    log: &ProvenanceLog,
) -> NodeId {
    let root = document.root();
    if let Some(existing) = document.find_child(root, kind, None) {
        return existing;
    }
    let created = document.append_element(root, kind, location.clone());
    log.record_node(
        &document.element_id(created),
        NodeRecord::new(ActionType::Injected, location.clone()),
    );
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfm_model::{RawDocument, RawElement};

    fn document(children: Vec<RawElement>) -> Document {
        let mut raw = RawDocument::manifest("main.xml", "com.example");
        raw.root.children = children;
        Document::from_raw(&raw).unwrap()
    }

    #[test]
    fn parses_property_names() {
        assert_eq!("version_code".parse::<SystemProperty>().unwrap(), SystemProperty::VersionCode);
        assert_eq!(
            "min-sdk-version".parse::<SystemProperty>().unwrap(),
            SystemProperty::MinSdkVersion
        );
        assert!(matches!(
            "colour".parse::<SystemProperty>(),
            Err(MergeError::UnknownProperty(_))
        ));
    }

    #[test]
    fn root_properties_are_written_and_logged() {
        let mut doc = document(vec![]);
        let log = ProvenanceLog::new();
        let overrides = BTreeMap::from([
            (SystemProperty::Package, "com.override".to_string()),
            (SystemProperty::VersionCode, "42".to_string()),
        ]);
        inject(&mut doc, &overrides, &log);

        let root = doc.node(doc.root());
        assert_eq!(root.attribute_value(&AttributeName::plain("package")), Some("com.override"));
        assert_eq!(root.attribute_value(&AttributeName::android("versionCode")), Some("42"));
        assert_eq!(doc.package(), Some("com.override"));

        let root_id = doc.element_id(doc.root());
        assert!(log.has_attribute_action(&root_id, &AttributeName::android("versionCode"), ActionType::Injected));
        assert!(log.has_attribute_action(&root_id, &AttributeName::plain("package"), ActionType::Injected));
    }

    #[test]
    fn missing_uses_sdk_is_created() {
        let mut doc = document(vec![RawElement::new("application")]);
        let log = ProvenanceLog::new();
        let overrides = BTreeMap::from([
            (SystemProperty::MinSdkVersion, "21".to_string()),
            (SystemProperty::TargetSdkVersion, "34".to_string()),
        ]);
        inject(&mut doc, &overrides, &log);

        let sdk = doc.find_first(NodeKind::UsesSdk).unwrap();
        let node = doc.node(sdk);
        assert_eq!(node.attribute_value(&AttributeName::android("minSdkVersion")), Some("21"));
        assert_eq!(node.attribute_value(&AttributeName::android("targetSdkVersion")), Some("34"));
        // Created once, reused for the second property.
        assert_eq!(doc.children(doc.root()).len(), 2);

        let sdk_id = doc.element_id(sdk);
        assert!(log.has_node_action(&sdk_id, ActionType::Injected));
        assert_eq!(log.node_records(&sdk_id).len(), 1);
    }

    #[test]
    fn existing_uses_sdk_is_updated() {
        let mut doc = document(vec![RawElement::new("uses-sdk").android("minSdkVersion", "14")]);
        let log = ProvenanceLog::new();
        let overrides = BTreeMap::from([(SystemProperty::MinSdkVersion, "21".to_string())]);
        inject(&mut doc, &overrides, &log);

        let sdk = doc.find_first(NodeKind::UsesSdk).unwrap();
        assert_eq!(
            doc.node(sdk).attribute_value(&AttributeName::android("minSdkVersion")),
            Some("21")
        );
        assert!(!log.has_node_action(&doc.element_id(sdk), ActionType::Injected));
    }
}
