//! XML output.
//!
//! Four-space indentation, no XML declaration, namespace declarations on the
//! root element only. Merge instructions are not written back.

use std::collections::{BTreeMap, BTreeSet};

use mfm_types::{AttributeName, TOOLS_URI};

use crate::document::Document;
use crate::node::NodeId;

const INDENT: &str = "    ";

impl Document {
    /// Render the document as XML text.
    pub fn to_xml(&self) -> String {
        let prefixes = self.prefixes();
        let mut declarations: Vec<(&str, &str)> = prefixes
            .iter()
            .map(|(uri, prefix)| (prefix.as_str(), uri.as_str()))
            .collect();
        declarations.sort();

        let mut out = String::new();
        self.write_element(&mut out, self.root(), 0, &prefixes, &declarations);
        out
    }

    /// URI to prefix for every namespace that is declared or used, minus
    /// the instruction namespace.
    ///
    /// Prefixes are unique: a URI whose preferred prefix is already bound
    /// to another URI gets a numbered one (`a1`, `a2`, ...).
    fn prefixes(&self) -> BTreeMap<String, String> {
        let mut prefixes = BTreeMap::new();
        let mut taken = BTreeSet::new();
        let declared = self
            .namespaces()
            .iter()
            .filter(|(_, uri)| uri.as_str() != TOOLS_URI)
            .map(|(prefix, uri)| (uri, prefix));
        let used: Vec<_> = self
            .descendants(self.root())
            .into_iter()
            .flat_map(|id| self.node(id).attributes())
            .filter_map(|attribute| match attribute.name() {
                AttributeName::Namespaced { uri, prefix, .. } => Some((uri, prefix)),
                AttributeName::Plain(_) => None,
            })
            .collect();

        for (uri, prefix) in declared.chain(used) {
            if prefixes.contains_key(uri) {
                continue;
            }
            let mut candidate = prefix.clone();
            let mut n = 1;
            while taken.contains(&candidate) {
                candidate = format!("{prefix}{n}");
                n += 1;
            }
            taken.insert(candidate.clone());
            prefixes.insert(uri.clone(), candidate);
        }
        prefixes
    }

    fn write_element(
        &self,
        out: &mut String,
        id: NodeId,
        depth: usize,
        prefixes: &BTreeMap<String, String>,
        declarations: &[(&str, &str)],
    ) {
        let node = self.node(id);
        let indent = INDENT.repeat(depth);
        for comment in node.comments() {
            out.push_str(&format!("{indent}<!-- {} -->\n", comment_text(comment)));
        }

        let name = node.kind().xml_name();
        out.push_str(&format!("{indent}<{name}"));
        for (prefix, uri) in declarations {
            out.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape(uri)));
        }
        for attribute in node.attributes() {
            let qualified = match attribute.name() {
                AttributeName::Plain(name) => name.clone(),
                AttributeName::Namespaced { uri, prefix, local } => {
                    let prefix = prefixes.get(uri).unwrap_or(prefix);
                    format!("{prefix}:{local}")
                }
            };
            out.push_str(&format!(" {qualified}=\"{}\"", escape(attribute.value())));
        }

        if node.children().is_empty() {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");
        for child in node.children() {
            self.write_element(out, *child, depth + 1, prefixes, &[]);
        }
        out.push_str(&format!("{indent}</{name}>\n"));
    }
}

/// Comment text with every `--` broken up, which XML forbids inside comments.
fn comment_text(comment: &str) -> String {
    let mut text = comment.trim().to_string();
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;
    use crate::raw::{RawDocument, RawElement};
    use mfm_types::ANDROID_URI;

    #[test]
    fn renders_indented_tree() {
        let raw = RawDocument::manifest("main.xml", "com.example")
            .child(RawElement::new("uses-permission").android("name", "android.permission.INTERNET"))
            .child(
                RawElement::new("application")
                    .comment(" the app ")
                    .android("label", "Tom & \"Jerry\"")
                    .child(RawElement::new("activity").android("name", ".Main").tools("node", "replace")),
            );
        let doc = Document::from_raw(&raw).unwrap();

        let expected = format!(
            "<manifest xmlns:android=\"{ANDROID_URI}\" package=\"com.example\">\n\
             \x20   <uses-permission android:name=\"android.permission.INTERNET\"/>\n\
             \x20   <!-- the app -->\n\
             \x20   <application android:label=\"Tom &amp; &quot;Jerry&quot;\">\n\
             \x20       <activity android:name=\"com.example.Main\"/>\n\
             \x20   </application>\n\
             </manifest>\n"
        );
        assert_eq!(doc.to_xml(), expected);
    }

    #[test]
    fn uses_root_prefix_for_imported_attributes() {
        let raw = RawDocument {
            source: "lib.xml".into(),
            namespaces: BTreeMap::from([("a".to_string(), ANDROID_URI.to_string())]),
            root: RawElement::new("manifest")
                .attr("package", "com.lib")
                .child(RawElement::new("uses-permission").attr("a:name", "p")),
        };
        let doc = Document::from_raw(&raw).unwrap();
        let xml = doc.to_xml();
        assert!(xml.starts_with(&format!("<manifest xmlns:a=\"{ANDROID_URI}\"")));
        assert!(xml.contains("<uses-permission a:name=\"p\"/>"));
        assert!(!xml.contains("tools"));
        assert!(!xml.starts_with("<?xml"));
    }

    #[test]
    fn comments_never_contain_double_hyphens() {
        let raw = RawDocument::manifest("main.xml", "com.example")
            .child(RawElement::new("application").comment("a -- b --- c-"));
        let xml = Document::from_raw(&raw).unwrap().to_xml();
        let line = xml.lines().find(|l| l.contains("<!--")).unwrap();
        let body = line
            .trim()
            .strip_prefix("<!--")
            .and_then(|l| l.strip_suffix("-->"))
            .unwrap();
        assert!(!body.contains("--"), "{line}");
        assert_eq!(body, " a - - b - - - c- ");
    }

    #[test]
    fn prefix_bound_to_two_uris_is_declared_once() {
        let other = "http://example.com/other";
        let base = RawDocument::manifest("main.xml", "com.example")
            .namespace("x", "http://example.com/main")
            .child(RawElement::new("uses-feature").attr("x:flag", "1"));
        let lib = RawDocument::manifest("lib.xml", "com.lib")
            .namespace("x", other)
            .child(RawElement::new("permission").android("name", "p").attr("x:flag", "2"));
        let mut doc = Document::from_raw(&base).unwrap();
        let lib = Document::from_raw(&lib).unwrap();
        let permission = lib.find_first(NodeKind::Permission).unwrap();
        let root = doc.root();
        doc.import_subtree(&lib, permission, root);

        let xml = doc.to_xml();
        assert_eq!(xml.matches("xmlns:x=").count(), 1, "{xml}");
        assert!(xml.contains(&format!("xmlns:x1=\"{other}\"")), "{xml}");
        assert!(xml.contains("<uses-feature x:flag=\"1\"/>"), "{xml}");
        assert!(xml.contains("x1:flag=\"2\""), "{xml}");
    }
}
