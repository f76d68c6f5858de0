use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MergeError, MergeResult};
use crate::injector::SystemProperty;

/// What happens after a child element is abandoned because it conflicts
/// with a higher priority declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMode {
    /// Stop the whole fold; the report carries no merged document.
    #[default]
    AbortMerge,
    /// Skip only the conflicting subtree and keep merging its siblings.
    SkipSubtree,
}

/// Configuration for a [`ManifestMerger`](crate::ManifestMerger).
///
/// ```toml
/// keep_intermediary_stages = true
/// on_conflict = "skip_subtree"
///
/// [overrides]
/// version_code = "42"
/// min_sdk_version = "21"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergerConfig {
    /// Keep an XML snapshot of the accumulated document after each step.
    pub keep_intermediary_stages: bool,
    /// Print file names instead of full paths in messages and the log.
    pub print_simple_filenames: bool,
    pub on_conflict: ConflictMode,
    /// System properties forced onto the merged document.
    #[serde(
        serialize_with = "serialize_overrides",
        deserialize_with = "deserialize_overrides"
    )]
    pub overrides: BTreeMap<SystemProperty, String>,
}

impl MergerConfig {
    pub fn from_toml_str(text: &str) -> MergeResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> MergeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|cause| MergeError::ConfigIo {
            path: path.display().to_string(),
            cause,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_override(mut self, property: SystemProperty, value: impl Into<String>) -> Self {
        self.overrides.insert(property, value.into());
        self
    }
}

fn serialize_overrides<S: Serializer>(
    overrides: &BTreeMap<SystemProperty, String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(overrides.iter().map(|(p, v)| (p.as_str(), v)))
}

fn deserialize_overrides<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<SystemProperty, String>, D::Error> {
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, value)| {
            name.parse::<SystemProperty>()
                .map(|property| (property, value))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}
