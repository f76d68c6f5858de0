use std::fmt;

use serde::{Deserialize, Serialize};

/// Provenance key of an element.
///
/// Keyed elements are identified as `kind#key`, independent of where they
/// sit in the tree. Keyless elements use their index among same-kind
/// siblings, qualified by the parent's id: `activity#com.foo.Main/intent-filter[0]`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Id of an element with a resolved key.
    pub fn keyed(kind: &str, key: &str) -> Self {
        Self(format!("{kind}#{key}"))
    }

    /// Id of a keyless element at `index` among its same-kind siblings.
    ///
    /// `parent` is `None` for children of the document root.
    pub fn keyless(parent: Option<&ElementId>, kind: &str, index: usize) -> Self {
        match parent {
            Some(parent) => Self(format!("{parent}/{kind}[{index}]")),
            None => Self(format!("{kind}[{index}]")),
        }
    }

    /// Id of the document root.
    pub fn root(kind: &str) -> Self {
        Self(kind.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_ids() {
        let id = ElementId::keyed("activity", "com.example.Main");
        assert_eq!(id.as_str(), "activity#com.example.Main");
    }

    #[test]
    fn keyless_ids_are_qualified_by_parent() {
        let parent = ElementId::keyed("activity", "com.example.Main");
        let filter = ElementId::keyless(Some(&parent), "intent-filter", 1);
        assert_eq!(filter.as_str(), "activity#com.example.Main/intent-filter[1]");
        assert_eq!(ElementId::keyless(None, "application", 0).as_str(), "application[0]");
    }
}
