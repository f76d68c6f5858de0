//! Namespace-aware attribute names.
//!
//! Two namespaced names are equal when their namespace URI and local name
//! are equal; the prefix is cosmetic and only used when printing. Different
//! documents may bind different prefixes to the same URI.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// The platform namespace holding `name` and most other attributes.
pub const ANDROID_URI: &str = "http://schemas.android.com/apk/res/android";

/// Conventional prefix bound to [`ANDROID_URI`].
pub const ANDROID_PREFIX: &str = "android";

/// The reserved namespace carrying merge instructions.
pub const TOOLS_URI: &str = "http://schemas.android.com/apk/res/android/tools";

/// Conventional prefix bound to [`TOOLS_URI`].
pub const TOOLS_PREFIX: &str = "tools";

/// An attribute name, either bare or namespace-qualified.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeName {
    /// A name declared without namespace, e.g. `package`.
    Plain(String),
    /// A name in a namespace, e.g. `android:name`.
    Namespaced {
        uri: String,
        prefix: String,
        local: String,
    },
}

impl AttributeName {
    /// Create a bare attribute name.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    /// Create a namespace-qualified attribute name.
    pub fn namespaced(
        uri: impl Into<String>,
        prefix: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self::Namespaced {
            uri: uri.into(),
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// Shorthand for an attribute in the platform namespace.
    pub fn android(local: impl Into<String>) -> Self {
        Self::namespaced(ANDROID_URI, ANDROID_PREFIX, local)
    }

    /// The local part of the name (the whole name when bare).
    pub fn local(&self) -> &str {
        match self {
            Self::Plain(name) => name,
            Self::Namespaced { local, .. } => local,
        }
    }

    /// The namespace URI, if any.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Namespaced { uri, .. } => Some(uri),
        }
    }

    /// Returns `true` if this name lives in the given namespace.
    pub fn is_in_namespace(&self, namespace_uri: &str) -> bool {
        self.uri() == Some(namespace_uri)
    }

    /// Returns `true` if this name is `namespace_uri`:`local`.
    pub fn matches(&self, namespace_uri: Option<&str>, local: &str) -> bool {
        self.uri() == namespace_uri && self.local() == local
    }
}

impl PartialEq for AttributeName {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Plain(a), Self::Plain(b)) => a == b,
            (
                Self::Namespaced { uri: ua, local: la, .. },
                Self::Namespaced { uri: ub, local: lb, .. },
            ) => ua == ub && la == lb,
            _ => false,
        }
    }
}

impl Eq for AttributeName {}

impl Hash for AttributeName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Prefix excluded, matching `eq`.
        self.uri().hash(state);
        self.local().hash(state);
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(name) => f.write_str(name),
            Self::Namespaced { prefix, local, .. } => write!(f, "{prefix}:{local}"),
        }
    }
}
