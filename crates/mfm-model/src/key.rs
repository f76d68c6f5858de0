//! Key resolution strategies.
//!
//! A key disambiguates same-kind siblings. Kinds that must be unique under
//! their parent have no key; most kinds read the platform `name` attribute.

use mfm_types::ANDROID_URI;

use crate::node::Attribute;

/// How a kind computes the key of its elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyResolver {
    /// The element is unique within its parent.
    None,
    /// The key is the value of the given attribute.
    Attribute {
        namespace: Option<&'static str>,
        local: &'static str,
    },
}

impl KeyResolver {
    /// The `android:name` resolver shared by most kinds.
    pub const NAME: KeyResolver = KeyResolver::Attribute {
        namespace: Some(ANDROID_URI),
        local: "name",
    };

    /// Resolve the key from an element's attributes.
    ///
    /// Pure: the same attributes always give the same key. Returns `None`
    /// for keyless kinds and when the key attribute is missing.
    pub fn resolve(&self, attributes: &[Attribute]) -> Option<String> {
        match self {
            Self::None => None,
            Self::Attribute { namespace, local } => attributes
                .iter()
                .find(|a| a.name().matches(*namespace, local))
                .map(|a| a.value().to_string()),
        }
    }

    /// Returns `true` if `attribute` is the one this resolver reads.
    pub fn reads(&self, attribute: &mfm_types::AttributeName) -> bool {
        match self {
            Self::None => false,
            Self::Attribute { namespace, local } => attribute.matches(*namespace, local),
        }
    }
}
