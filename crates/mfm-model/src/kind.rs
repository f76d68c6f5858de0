//! The closed set of element kinds and their static metadata.
//!
//! Every merge decision the engine takes is driven from this table: the
//! default [`MergePolicy`], how the key is resolved, which attributes hold
//! class names that are expanded with the document package, and which
//! attribute values are validated after merging. Extending the model means
//! adding a row here, never special-casing the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mfm_types::{AttributeName, MergePolicy, ANDROID_URI};

use crate::error::ModelError;
use crate::key::KeyResolver;
use crate::validate::{self, AttributeValidator};

/// Recognized element kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Manifest,
    Action,
    Activity,
    ActivityAlias,
    Application,
    Category,
    Instrumentation,
    IntentFilter,
    MetaData,
    Permission,
    PermissionGroup,
    PermissionTree,
    Provider,
    Receiver,
    Service,
    SupportsScreens,
    UsesConfiguration,
    UsesFeature,
    UsesLibrary,
    UsesPermission,
    UsesSdk,
}

/// Static metadata attached to a [`NodeKind`].
pub struct KindDescriptor {
    pub kind: NodeKind,
    /// Element name as written in documents.
    pub xml_name: &'static str,
    pub policy: MergePolicy,
    pub key: KeyResolver,
    /// Local names (platform namespace) holding possibly shortened class names.
    pub package_dependent: &'static [&'static str],
    /// Validators keyed by local name (platform namespace).
    pub validators: &'static [(&'static str, AttributeValidator)],
}

const NO_ATTRS: &[&str] = &[];
const NO_VALIDATORS: &[(&str, AttributeValidator)] = &[];
const COMPONENT_VALIDATORS: &[(&str, AttributeValidator)] = &[
    ("exported", validate::boolean),
    ("enabled", validate::boolean),
];
const APPLICATION_VALIDATORS: &[(&str, AttributeValidator)] = &[("enabled", validate::boolean)];
const USES_FEATURE_VALIDATORS: &[(&str, AttributeValidator)] = &[
    ("required", validate::boolean),
    ("glEsVersion", validate::gl_es_version),
];
const USES_LIBRARY_VALIDATORS: &[(&str, AttributeValidator)] = &[("required", validate::boolean)];
const USES_SDK_VALIDATORS: &[(&str, AttributeValidator)] = &[
    ("minSdkVersion", validate::sdk_version),
    ("targetSdkVersion", validate::sdk_version),
    ("maxSdkVersion", validate::sdk_version),
];

const CLASS_NAME: &[&str] = &["name"];
const ACTIVITY_CLASS_NAMES: &[&str] = &["name", "parentActivityName"];
const ALIAS_CLASS_NAMES: &[&str] = &["name", "targetActivity"];
const APPLICATION_CLASS_NAMES: &[&str] = &["name", "backupAgent"];

const fn describe(
    kind: NodeKind,
    xml_name: &'static str,
    policy: MergePolicy,
    key: KeyResolver,
    package_dependent: &'static [&'static str],
    validators: &'static [(&'static str, AttributeValidator)],
) -> KindDescriptor {
    KindDescriptor {
        kind,
        xml_name,
        policy,
        key,
        package_dependent,
        validators,
    }
}

use MergePolicy::{Conflict, Ignore, Merge, RespectInstructions};

/// Indexed by `NodeKind as usize`; order must follow [`NodeKind::ALL`].
static DESCRIPTORS: [KindDescriptor; 21] = [
    describe(NodeKind::Manifest, "manifest", Ignore, KeyResolver::None, NO_ATTRS, NO_VALIDATORS),
    describe(NodeKind::Action, "action", Conflict, KeyResolver::NAME, NO_ATTRS, NO_VALIDATORS),
    describe(
        NodeKind::Activity,
        "activity",
        RespectInstructions,
        KeyResolver::NAME,
        ACTIVITY_CLASS_NAMES,
        COMPONENT_VALIDATORS,
    ),
    describe(
        NodeKind::ActivityAlias,
        "activity-alias",
        RespectInstructions,
        KeyResolver::NAME,
        ALIAS_CLASS_NAMES,
        COMPONENT_VALIDATORS,
    ),
    describe(
        NodeKind::Application,
        "application",
        Merge,
        KeyResolver::None,
        APPLICATION_CLASS_NAMES,
        APPLICATION_VALIDATORS,
    ),
    describe(NodeKind::Category, "category", RespectInstructions, KeyResolver::NAME, NO_ATTRS, NO_VALIDATORS),
    describe(
        NodeKind::Instrumentation,
        "instrumentation",
        RespectInstructions,
        KeyResolver::NAME,
        CLASS_NAME,
        NO_VALIDATORS,
    ),
    describe(
        NodeKind::IntentFilter,
        "intent-filter",
        RespectInstructions,
        KeyResolver::None,
        NO_ATTRS,
        NO_VALIDATORS,
    ),
    describe(NodeKind::MetaData, "meta-data", RespectInstructions, KeyResolver::NAME, NO_ATTRS, NO_VALIDATORS),
    describe(NodeKind::Permission, "permission", RespectInstructions, KeyResolver::NAME, NO_ATTRS, NO_VALIDATORS),
    describe(
        NodeKind::PermissionGroup,
        "permission-group",
        RespectInstructions,
        KeyResolver::NAME,
        NO_ATTRS,
        NO_VALIDATORS,
    ),
    describe(
        NodeKind::PermissionTree,
        "permission-tree",
        RespectInstructions,
        KeyResolver::NAME,
        NO_ATTRS,
        NO_VALIDATORS,
    ),
    describe(
        NodeKind::Provider,
        "provider",
        RespectInstructions,
        KeyResolver::NAME,
        CLASS_NAME,
        COMPONENT_VALIDATORS,
    ),
    describe(
        NodeKind::Receiver,
        "receiver",
        RespectInstructions,
        KeyResolver::NAME,
        CLASS_NAME,
        COMPONENT_VALIDATORS,
    ),
    describe(
        NodeKind::Service,
        "service",
        RespectInstructions,
        KeyResolver::NAME,
        CLASS_NAME,
        COMPONENT_VALIDATORS,
    ),
    describe(
        NodeKind::SupportsScreens,
        "supports-screens",
        RespectInstructions,
        KeyResolver::None,
        NO_ATTRS,
        NO_VALIDATORS,
    ),
    describe(
        NodeKind::UsesConfiguration,
        "uses-configuration",
        RespectInstructions,
        KeyResolver::None,
        NO_ATTRS,
        NO_VALIDATORS,
    ),
    describe(
        NodeKind::UsesFeature,
        "uses-feature",
        RespectInstructions,
        KeyResolver::NAME,
        NO_ATTRS,
        USES_FEATURE_VALIDATORS,
    ),
    describe(
        NodeKind::UsesLibrary,
        "uses-library",
        Conflict,
        KeyResolver::NAME,
        NO_ATTRS,
        USES_LIBRARY_VALIDATORS,
    ),
    describe(
        NodeKind::UsesPermission,
        "uses-permission",
        RespectInstructions,
        KeyResolver::NAME,
        NO_ATTRS,
        NO_VALIDATORS,
    ),
    describe(
        NodeKind::UsesSdk,
        "uses-sdk",
        Conflict,
        KeyResolver::None,
        NO_ATTRS,
        USES_SDK_VALIDATORS,
    ),
];

impl NodeKind {
    /// All kinds, in table order.
    pub const ALL: [NodeKind; 21] = [
        NodeKind::Manifest,
        NodeKind::Action,
        NodeKind::Activity,
        NodeKind::ActivityAlias,
        NodeKind::Application,
        NodeKind::Category,
        NodeKind::Instrumentation,
        NodeKind::IntentFilter,
        NodeKind::MetaData,
        NodeKind::Permission,
        NodeKind::PermissionGroup,
        NodeKind::PermissionTree,
        NodeKind::Provider,
        NodeKind::Receiver,
        NodeKind::Service,
        NodeKind::SupportsScreens,
        NodeKind::UsesConfiguration,
        NodeKind::UsesFeature,
        NodeKind::UsesLibrary,
        NodeKind::UsesPermission,
        NodeKind::UsesSdk,
    ];

    /// The static metadata for this kind.
    pub fn descriptor(self) -> &'static KindDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn xml_name(self) -> &'static str {
        self.descriptor().xml_name
    }

    pub fn policy(self) -> MergePolicy {
        self.descriptor().policy
    }

    pub fn key_resolver(self) -> KeyResolver {
        self.descriptor().key
    }

    /// Look up a kind from its element name.
    pub fn from_xml_name(name: &str) -> Option<NodeKind> {
        DESCRIPTORS.iter().find(|d| d.xml_name == name).map(|d| d.kind)
    }

    /// Returns `true` if the attribute holds a class name that is expanded
    /// with the document package.
    pub fn is_package_dependent(self, name: &AttributeName) -> bool {
        name.is_in_namespace(ANDROID_URI)
            && self.descriptor().package_dependent.contains(&name.local())
    }

    /// The validator registered for an attribute, if any.
    pub fn validator_for(self, name: &AttributeName) -> Option<AttributeValidator> {
        if !name.is_in_namespace(ANDROID_URI) {
            return None;
        }
        self.descriptor()
            .validators
            .iter()
            .find(|(local, _)| *local == name.local())
            .map(|(_, validator)| *validator)
    }
}

impl FromStr for NodeKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_xml_name(s).ok_or_else(|| ModelError::UnknownElement {
            name: s.to_string(),
            location: None,
        })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_enum() {
        for (index, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index);
            assert_eq!(kind.descriptor().kind, *kind);
        }
    }

    #[test]
    fn xml_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_xml_name(kind.xml_name()), Some(kind));
        }
        assert_eq!("activity-alias".parse::<NodeKind>().unwrap(), NodeKind::ActivityAlias);
        assert!("widget".parse::<NodeKind>().is_err());
    }

    #[test]
    fn default_policies() {
        assert_eq!(NodeKind::Manifest.policy(), MergePolicy::Ignore);
        assert_eq!(NodeKind::Application.policy(), MergePolicy::Merge);
        assert_eq!(NodeKind::UsesSdk.policy(), MergePolicy::Conflict);
        assert_eq!(NodeKind::Action.policy(), MergePolicy::Conflict);
        assert_eq!(NodeKind::Activity.policy(), MergePolicy::RespectInstructions);
    }

    #[test]
    fn only_root_is_ignored() {
        let ignored: Vec<_> = NodeKind::ALL
            .iter()
            .filter(|k| k.policy() == MergePolicy::Ignore)
            .collect();
        assert_eq!(ignored, vec![&NodeKind::Manifest]);
    }

    #[test]
    fn package_dependent_attributes() {
        assert!(NodeKind::Activity.is_package_dependent(&AttributeName::android("name")));
        assert!(NodeKind::Activity
            .is_package_dependent(&AttributeName::android("parentActivityName")));
        assert!(NodeKind::Application.is_package_dependent(&AttributeName::android("backupAgent")));
        assert!(!NodeKind::Activity.is_package_dependent(&AttributeName::android("label")));
        assert!(!NodeKind::Activity.is_package_dependent(&AttributeName::plain("name")));
        assert!(!NodeKind::UsesPermission.is_package_dependent(&AttributeName::android("name")));
    }

    #[test]
    fn validators_are_registered_per_kind() {
        assert!(NodeKind::UsesSdk
            .validator_for(&AttributeName::android("minSdkVersion"))
            .is_some());
        assert!(NodeKind::UsesSdk.validator_for(&AttributeName::plain("minSdkVersion")).is_none());
        assert!(NodeKind::Category.validator_for(&AttributeName::android("name")).is_none());
    }
}
