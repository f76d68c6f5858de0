//! Parsed-but-uninterpreted documents.
//!
//! A [`RawDocument`] is what the parsing layer hands over: element names,
//! qualified attribute names as written (`android:name`), leading comments,
//! and positions. It is also the JSON interchange form read by
//! [`JsonFileLoader`](crate::JsonFileLoader).
//!
//! ```json
//! {
//!   "source": "app/AndroidManifest.xml",
//!   "root": {
//!     "name": "manifest",
//!     "attributes": [{ "name": "package", "value": "com.example" }],
//!     "children": [
//!       { "name": "uses-permission",
//!         "position": { "line": 3, "column": 5 },
//!         "attributes": [{ "name": "android:name", "value": "android.permission.INTERNET" }] }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mfm_types::{Position, SourceId, ANDROID_PREFIX, ANDROID_URI, TOOLS_PREFIX, TOOLS_URI};

/// A whole parsed document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default = "unnamed_source")]
    pub source: SourceId,
    /// Prefix to URI bindings. `xmlns` attributes found on elements are
    /// added to these when the document is built.
    #[serde(default = "default_namespaces")]
    pub namespaces: BTreeMap<String, String>,
    pub root: RawElement,
}

fn unnamed_source() -> SourceId {
    SourceId::new("<unnamed>")
}

/// The platform and reserved-instruction namespaces under their usual prefixes.
pub fn default_namespaces() -> BTreeMap<String, String> {
    BTreeMap::from([
        (ANDROID_PREFIX.to_string(), ANDROID_URI.to_string()),
        (TOOLS_PREFIX.to_string(), TOOLS_URI.to_string()),
    ])
}

impl RawDocument {
    pub fn new(source: impl Into<SourceId>, root: RawElement) -> Self {
        Self {
            source: source.into(),
            namespaces: default_namespaces(),
            root,
        }
    }

    /// A `<manifest package="...">` document with no children yet.
    pub fn manifest(source: impl Into<SourceId>, package: &str) -> Self {
        Self::new(source, RawElement::new("manifest").at(1, 1).attr("package", package))
    }

    /// Bind an extra namespace prefix.
    pub fn namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
        self
    }

    /// Append a child to the root element.
    pub fn child(mut self, child: RawElement) -> Self {
        self.root.children.push(child);
        self
    }
}

/// One attribute as written in the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttribute {
    /// Qualified name, `prefix:local` or bare.
    pub name: String,
    pub value: String,
}

/// One element as written in the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawElement {
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
    #[serde(default)]
    pub children: Vec<RawElement>,
    /// Comments immediately preceding this element.
    #[serde(default)]
    pub comments: Vec<String>,
}

impl RawElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: Position::default(),
            attributes: Vec::new(),
            children: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.position = Position::new(line, column);
        self
    }

    /// Add an attribute by its qualified name.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(RawAttribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Add an `android:` attribute.
    pub fn android(self, local: &str, value: &str) -> Self {
        self.attr(&format!("{ANDROID_PREFIX}:{local}"), value)
    }

    /// Add a `tools:` merge instruction.
    pub fn tools(self, local: &str, value: &str) -> Self {
        self.attr(&format!("{TOOLS_PREFIX}:{local}"), value)
    }

    pub fn child(mut self, child: RawElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.comments.push(text.to_string());
        self
    }
}
