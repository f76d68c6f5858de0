//! Document loading.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use mfm_types::SourceId;

use crate::document::Document;
use crate::error::LoadError;
use crate::raw::RawDocument;

/// Turns a source identifier into a [`Document`].
///
/// Implementations must be pure with respect to the merge: loading the same
/// source twice yields equal documents.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, source: &SourceId) -> Result<Document, LoadError>;
}

/// Loader over documents held in memory.
///
/// Intended for tests and embedding.
pub struct InMemoryLoader {
    documents: RwLock<HashMap<SourceId, RawDocument>>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Register a document under its own source id, replacing any previous one.
    pub fn insert(&self, document: RawDocument) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(document.source.clone(), document);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, document: RawDocument) -> Self {
        self.insert(document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for InMemoryLoader {
    fn load(&self, source: &SourceId) -> Result<Document, LoadError> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        let raw = documents
            .get(source)
            .ok_or_else(|| LoadError::NotFound(source.clone()))?;
        Ok(Document::from_raw(raw)?)
    }
}

/// Loader reading the JSON form of [`RawDocument`] from the file system.
///
/// The source id is the file path; any `source` field inside the file is
/// overridden so that locations point at the file actually read.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFileLoader;

impl JsonFileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a file without interpreting it.
    pub fn read_raw(&self, source: &SourceId) -> Result<RawDocument, LoadError> {
        let path = Path::new(source.as_str());
        let text = std::fs::read_to_string(path).map_err(|cause| {
            if cause.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(source.clone())
            } else {
                LoadError::Io {
                    source_id: source.clone(),
                    cause,
                }
            }
        })?;
        let mut raw: RawDocument = serde_json::from_str(&text).map_err(|e| LoadError::Parse {
            source_id: source.clone(),
            message: e.to_string(),
        })?;
        raw.source = source.clone();
        debug!(%source, bytes = text.len(), "read document");
        Ok(raw)
    }
}

impl DocumentLoader for JsonFileLoader {
    fn load(&self, source: &SourceId) -> Result<Document, LoadError> {
        let raw = self.read_raw(source)?;
        Ok(Document::from_raw(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;
    use crate::raw::RawElement;
    use std::io::Write;

    #[test]
    fn in_memory_round_trip() {
        let loader = InMemoryLoader::new().with(
            RawDocument::manifest("main.xml", "com.example")
                .child(RawElement::new("uses-permission").android("name", "p")),
        );
        assert_eq!(loader.len(), 1);

        let doc = loader.load(&SourceId::new("main.xml")).unwrap();
        assert_eq!(doc.package(), Some("com.example"));
        assert!(doc.find_first(NodeKind::UsesPermission).is_some());
    }

    #[test]
    fn in_memory_missing_document() {
        let loader = InMemoryLoader::default();
        assert!(loader.is_empty());
        let err = loader.load(&SourceId::new("nope.xml")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn in_memory_model_errors_surface() {
        let loader = InMemoryLoader::new()
            .with(RawDocument::manifest("bad.xml", "com.example").child(RawElement::new("widget")));
        let err = loader.load(&SourceId::new("bad.xml")).unwrap_err();
        assert!(matches!(err, LoadError::Model(_)));
    }

    #[test]
    fn json_file_uses_path_as_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "source": "something-else",
                "root": {{
                    "name": "manifest",
                    "attributes": [{{ "name": "package", "value": "com.lib" }}],
                    "children": [{{
                        "name": "activity",
                        "position": {{ "line": 4, "column": 9 }},
                        "attributes": [{{ "name": "android:name", "value": ".LibActivity" }}]
                    }}]
                }}
            }}"#
        )
        .unwrap();

        let source = SourceId::new(path.to_string_lossy().into_owned());
        let doc = JsonFileLoader::new().load(&source).unwrap();
        assert_eq!(doc.source(), &source);

        let activity = doc.find_first(NodeKind::Activity).unwrap();
        assert_eq!(doc.node(activity).key(), Some("com.lib.LibActivity"));
        assert_eq!(doc.node(activity).location().position.line, 4);
    }

    #[test]
    fn json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SourceId::new(dir.path().join("missing.json").to_string_lossy().into_owned());
        assert!(matches!(
            JsonFileLoader::new().load(&missing),
            Err(LoadError::NotFound(_))
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let broken = SourceId::new(path.to_string_lossy().into_owned());
        assert!(matches!(
            JsonFileLoader::new().load(&broken),
            Err(LoadError::Parse { .. })
        ));
    }
}
