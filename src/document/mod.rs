//! Parsed XML documents and node introspection.
//!
//! [`Document`] owns a parsed tree together with the XPath engine's document
//! collection, so the same value can be both inspected node by node and
//! queried with expressions. Nodes are addressed by [`NodeId`] handles, which
//! are cheap to copy and compare.
//!
//! # Examples
//!
//! ```
//! use xml2xpath::document::{Document, NodeKind};
//!
//! let doc = Document::parse_str(r#"<root xmlns="urn:x"><child/></root>"#).unwrap();
//! let root = doc.root_element().unwrap();
//! assert_eq!(doc.node_kind(root), NodeKind::Element);
//! assert_eq!(doc.local_name(root), Some("root"));
//! assert_eq!(doc.namespace_uri(root), Some("urn:x"));
//! ```

mod encoding;
mod path;
mod prolog;

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use xee_xpath::error::ErrorValue;
use xee_xpath::{DocumentHandle, Documents};
use xot::{ValueType, Xot};

use crate::error::{Error, Operation};

/// Handle to a node inside a [`Document`].
pub type NodeId = xot::Node;

/// The kind of a node, as far as path qualification is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document node holding the root element and prolog.
    Document,
    /// An element.
    Element,
    /// Character data.
    Text,
    /// A comment.
    Comment,
    /// A processing instruction.
    ProcessingInstruction,
    /// An attribute.
    Attribute,
    /// A namespace node.
    Namespace,
}

impl NodeKind {
    /// Returns `true` for the kinds a qualification run can record: elements,
    /// comments and processing instructions.
    pub fn is_qualifiable(self) -> bool {
        matches!(
            self,
            Self::Element | Self::Comment | Self::ProcessingInstruction
        )
    }
}

impl From<ValueType> for NodeKind {
    fn from(value: ValueType) -> Self {
        match value {
            ValueType::Document => Self::Document,
            ValueType::Element => Self::Element,
            ValueType::Text => Self::Text,
            ValueType::Comment => Self::Comment,
            ValueType::ProcessingInstruction => Self::ProcessingInstruction,
            ValueType::Attribute => Self::Attribute,
            ValueType::Namespace => Self::Namespace,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Element => "element",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::ProcessingInstruction => "processing instruction",
            Self::Attribute => "attribute",
            Self::Namespace => "namespace",
        };
        f.write_str(name)
    }
}

/// A namespace node found on the namespace axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// The declared prefix, or `None` for a default namespace.
    pub prefix: Option<String>,
    /// The namespace URI.
    pub uri: String,
}

/// A parsed XML document.
#[derive(Debug)]
pub struct Document {
    documents: Documents,
    handle: DocumentHandle,
    root: NodeId,
}

impl Document {
    /// Parses a document from a string.
    ///
    /// A document type declaration without internal subset is skipped; the
    /// DTD it names is never read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the input is not well-formed XML or
    /// declares an internal DTD subset.
    pub fn parse_str(input: &str) -> Result<Self, Error> {
        let input = prolog::strip_doctype(input);
        let mut documents = Documents::new();
        let handle = documents.add_string_without_uri(&input)?;
        let root = documents
            .document_node(handle)
            .ok_or_else(|| Error::XPath {
                operation: Operation::Load,
                expression: "/".to_string(),
                source: ErrorValue::FODC0002.into(),
            })?;
        Ok(Self {
            documents,
            handle,
            root,
        })
    }

    /// Parses a document from raw bytes.
    ///
    /// The character encoding is detected from a byte order mark or the XML
    /// declaration and defaults to UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the bytes cannot be decoded, otherwise
    /// the errors of [`Document::parse_str`].
    pub fn parse_bytes(input: &[u8]) -> Result<Self, Error> {
        Self::parse_str(&encoding::decode(input)?)
    }

    /// Reads and parses the document stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputNotFound`] when nothing exists at `path`, before
    /// any reading is attempted, [`Error::Io`] when the file cannot be read,
    /// and the errors of [`Document::parse_bytes`] for its content.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let input = fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::parse_bytes(&input)
    }

    /// Returns the document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the root element, if the document has one.
    pub fn root_element(&self) -> Option<NodeId> {
        self.xot().document_element(self.root).ok()
    }

    pub(crate) fn xot(&self) -> &Xot {
        self.documents.xot()
    }

    pub(crate) fn engine_mut(&mut self) -> (&mut Documents, DocumentHandle) {
        (&mut self.documents, self.handle)
    }

    /// Returns the kind of `node`.
    pub fn node_kind(&self, node: NodeId) -> NodeKind {
        self.xot().value_type(node).into()
    }

    /// Returns the parent of `node` if that parent is an element.
    ///
    /// The root element and top-level comments or processing instructions
    /// have no parent element.
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        let xot = self.xot();
        xot.parent(node).filter(|&parent| xot.is_element(parent))
    }

    /// Returns the local name of an element, or the target of a processing
    /// instruction.
    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        let xot = self.xot();
        if let Some(element) = xot.element(node) {
            return Some(xot.local_name_str(element.name()));
        }
        xot.processing_instruction(node)
            .map(|pi| xot.local_name_str(pi.target()))
    }

    /// Returns the namespace URI of an element, or `None` if the element is
    /// in no namespace or `node` is not an element.
    pub fn namespace_uri(&self, node: NodeId) -> Option<&str> {
        let xot = self.xot();
        let element = xot.element(node)?;
        let uri = xot.uri_str(element.name());
        (!uri.is_empty()).then_some(uri)
    }

    /// Returns the local names of the attributes of `node`, in document order.
    ///
    /// Returns an empty list for non-elements.
    pub fn attribute_names(&self, node: NodeId) -> Vec<String> {
        let xot = self.xot();
        xot.attributes(node)
            .keys()
            .map(|name| xot.local_name_str(name).to_string())
            .collect()
    }

    /// Returns the positional absolute path of `node`.
    ///
    /// Elements in a default namespace appear as `*`, so the result is
    /// unambiguous but not namespace-qualified, e.g. `/*/*[3]`.
    pub fn node_path(&self, node: NodeId) -> String {
        path::node_path(self.xot(), node)
    }

    /// Walks the namespace axis of every element in document order.
    ///
    /// Each element contributes its in-scope namespaces: its own declarations
    /// first, then those of its ancestors that it does not shadow. The `xml`
    /// prefix and namespace undeclarations (`xmlns=""`) are left out.
    pub fn namespace_bindings(&self) -> Vec<NamespaceBinding> {
        let xot = self.xot();
        let xml_prefix = xot.xml_prefix();
        let mut bindings = Vec::new();

        for element in xot.descendants(self.root).filter(|&n| xot.is_element(n)) {
            let mut seen = Vec::new();
            for scope in xot.ancestors(element) {
                for (prefix, namespace) in xot.namespaces(scope).iter() {
                    if prefix == xml_prefix || seen.contains(&prefix) {
                        continue;
                    }
                    seen.push(prefix);
                    let uri = xot.namespace_str(*namespace);
                    if uri.is_empty() {
                        continue;
                    }
                    let prefix = xot.prefix_str(prefix);
                    bindings.push(NamespaceBinding {
                        prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
                        uri: uri.to_string(),
                    });
                }
            }
        }

        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_child_element(doc: &Document, node: NodeId) -> NodeId {
        let xot = doc.xot();
        xot.children(node)
            .find(|&n| xot.is_element(n))
            .unwrap_or_else(|| panic!("no child element"))
    }

    #[test]
    fn test_parse_str_and_root_element() {
        let doc = Document::parse_str("<root><a/></root>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.node_kind(doc.root()), NodeKind::Document);
        assert_eq!(doc.local_name(root), Some("root"));
        assert_eq!(doc.namespace_uri(root), None);
        assert_eq!(doc.parent_element(root), None);
    }

    #[test]
    fn test_parse_str_rejects_malformed_input() {
        let err = Document::parse_str("<root><a></root>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_str_skips_doctype() {
        let doc = Document::parse_str(
            "<?xml version=\"1.0\"?>\n<!DOCTYPE html>\n<html xmlns=\"http://www.w3.org/1999/xhtml\"><body/></html>",
        )
        .unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.local_name(root), Some("html"));
        assert_eq!(doc.node_path(root), "/*");
    }

    #[test]
    fn test_parse_str_rejects_internal_subset() {
        let err = Document::parse_str("<!DOCTYPE doc [<!ENTITY e \"x\">]><doc>&e;</doc>")
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_bytes_declared_encoding() {
        let doc = Document::parse_bytes(
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><caf\xe9/>",
        )
        .unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.local_name(root), Some("caf\u{e9}"));
    }

    #[test]
    fn test_parse_bytes_malformed() {
        let err = Document::parse_bytes(b"<root>\xff</root>").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_parse_file_missing() {
        let err = Document::parse_file("does/not/exist.xml").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parent_element() {
        let doc = Document::parse_str("<root><a><b/></a></root>").unwrap();
        let root = doc.root_element().unwrap();
        let a = first_child_element(&doc, root);
        let b = first_child_element(&doc, a);
        assert_eq!(doc.parent_element(b), Some(a));
        assert_eq!(doc.parent_element(a), Some(root));
    }

    #[test]
    fn test_attribute_names_in_order() {
        let doc = Document::parse_str(
            r#"<root xmlns:x="urn:x" id="1" x:lang="en" class="c"/>"#,
        )
        .unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.attribute_names(root), vec!["id", "lang", "class"]);
        assert!(doc.attribute_names(doc.root()).is_empty());
    }

    #[test]
    fn test_processing_instruction_target() {
        let doc = Document::parse_str("<root><?app data?></root>").unwrap();
        let root = doc.root_element().unwrap();
        let pi = doc.xot().first_child(root).unwrap();
        assert_eq!(doc.node_kind(pi), NodeKind::ProcessingInstruction);
        assert_eq!(doc.local_name(pi), Some("app"));
        assert_eq!(doc.namespace_uri(pi), None);
    }

    #[test]
    fn test_namespace_bindings_in_scope() {
        let doc = Document::parse_str(
            r#"<a xmlns="urn:a" xmlns:p="urn:p"><b xmlns="urn:b"/></a>"#,
        )
        .unwrap();
        let pairs: Vec<_> = doc
            .namespace_bindings()
            .into_iter()
            .map(|b| (b.prefix, b.uri))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (None, "urn:a".to_string()),
                (Some("p".to_string()), "urn:p".to_string()),
                (None, "urn:b".to_string()),
                (Some("p".to_string()), "urn:p".to_string()),
            ]
        );
    }

    #[test]
    fn test_namespace_bindings_skip_undeclaration() {
        let doc = Document::parse_str(r#"<a xmlns="urn:a"><b xmlns=""/></a>"#).unwrap();
        let uris: Vec<_> = doc
            .namespace_bindings()
            .into_iter()
            .map(|b| b.uri)
            .collect();
        assert_eq!(uris, vec!["urn:a"]);
    }

    #[test]
    fn test_node_kind_display() {
        assert_eq!(NodeKind::Text.to_string(), "text");
        assert_eq!(
            NodeKind::ProcessingInstruction.to_string(),
            "processing instruction"
        );
        assert!(NodeKind::Comment.is_qualifiable());
        assert!(!NodeKind::Attribute.is_qualifiable());
    }
}
