//! `XPath` evaluation against a [`Document`].
//!
//! Expressions are compiled with the document's [`NamespaceMap`] as the
//! static namespace context, so both explicit and synthetic prefixes
//! (`ns98`, ...) can be used in them. Evaluation always starts at the
//! document node. Name tests whose prefix or local part is a keyword of the
//! expression grammar (`ns98:div`, `ns98:child`) are rewritten before
//! compiling; see [`names`].
//!
//! # Examples
//!
//! ```
//! use xml2xpath::document::Document;
//! use xml2xpath::namespace;
//! use xml2xpath::xpath;
//!
//! let mut doc = Document::parse_str(r#"<root xmlns="urn:x"><a/><a/></root>"#).unwrap();
//! let namespaces = namespace::resolve(&doc);
//! assert_eq!(xpath::count(&mut doc, "/ns98:root/ns98:a", &namespaces).unwrap(), 2);
//! assert_eq!(xpath::select(&mut doc, "//*", &namespaces).unwrap().len(), 3);
//! ```

mod names;

use xee_xpath::context::StaticContextBuilder;
use xee_xpath::{Queries, Query};

use crate::document::{Document, NodeId};
use crate::error::{Error, Operation};
use crate::namespace::NamespaceMap;

/// Evaluates `expression` and returns the selected nodes in document order.
///
/// # Errors
///
/// Returns [`Error::XPath`] if the expression does not compile, fails to
/// evaluate, or yields something other than nodes.
pub fn select(
    doc: &mut Document,
    expression: &str,
    namespaces: &NamespaceMap,
) -> Result<Vec<NodeId>, Error> {
    let wrap =
        |source: xee_xpath::error::Error| engine_error(Operation::Select, expression, source);

    let compiled = names::rewrite_name_tests(expression, namespaces);
    let queries = Queries::new(static_context(namespaces));
    let query = queries.sequence(&compiled).map_err(wrap)?;
    let (documents, handle) = doc.engine_mut();
    let sequence = query.execute(documents, handle).map_err(wrap)?;

    sequence
        .iter()
        .map(|item| item.to_node().map_err(|e| wrap(e.into())))
        .collect()
}

/// Returns the number of nodes matched by `expression`, evaluated as
/// `count(expression)`.
///
/// # Errors
///
/// Returns [`Error::XPath`] if the expression does not compile or fails to
/// evaluate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count(
    doc: &mut Document,
    expression: &str,
    namespaces: &NamespaceMap,
) -> Result<usize, Error> {
    let wrap =
        |source: xee_xpath::error::Error| engine_error(Operation::Count, expression, source);

    let compiled = names::rewrite_name_tests(expression, namespaces);
    let queries = Queries::new(static_context(namespaces));
    let query = queries
        .one(&format!("count({compiled})"), |_, item| {
            Ok(item.try_into_value::<f64>()?)
        })
        .map_err(wrap)?;
    let (documents, handle) = doc.engine_mut();
    let matches = query.execute(documents, handle).map_err(wrap)?;

    Ok(matches as usize)
}

fn static_context(namespaces: &NamespaceMap) -> StaticContextBuilder<'_> {
    let mut builder = StaticContextBuilder::default();
    builder.namespaces(namespaces.prefixes());
    builder
}

fn engine_error(operation: Operation, expression: &str, source: xee_xpath::error::Error) -> Error {
    Error::XPath {
        operation,
        expression: expression.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace;

    fn parse(xml: &str) -> (Document, NamespaceMap) {
        let doc = Document::parse_str(xml).unwrap();
        let namespaces = namespace::resolve(&doc);
        (doc, namespaces)
    }

    #[test]
    fn test_select_in_document_order() {
        let (mut doc, namespaces) = parse("<root><a/><b/><!--c--></root>");
        let nodes = select(&mut doc, "//* | //comment()", &namespaces).unwrap();
        let paths: Vec<_> = nodes.iter().map(|&n| doc.node_path(n)).collect();
        assert_eq!(paths, vec!["/root", "/root/a", "/root/b", "/root/comment()"]);
    }

    #[test]
    fn test_select_with_synthetic_prefix() {
        let (mut doc, namespaces) = parse(r#"<root xmlns="urn:x"><item/></root>"#);
        let nodes = select(&mut doc, "//ns98:item", &namespaces).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(doc.local_name(nodes[0]), Some("item"));
    }

    #[test]
    fn test_select_atomic_result_is_error() {
        let (mut doc, namespaces) = parse("<root/>");
        let err = select(&mut doc, "1 + 1", &namespaces).unwrap_err();
        assert!(matches!(
            err,
            Error::XPath {
                operation: Operation::Select,
                ..
            }
        ));
    }

    #[test]
    fn test_select_syntax_error() {
        let (mut doc, namespaces) = parse("<root/>");
        let err = select(&mut doc, "//*[", &namespaces).unwrap_err();
        assert!(err.to_string().starts_with("node selection failed for `//*[`"));
    }

    #[test]
    fn test_count_prefixed_path() {
        let (mut doc, namespaces) = parse(
            r#"<s:Envelope xmlns:s="urn:s"><s:Body><a/><a/></s:Body></s:Envelope>"#,
        );
        assert_eq!(count(&mut doc, "/s:Envelope/s:Body/a", &namespaces).unwrap(), 2);
        assert_eq!(count(&mut doc, "/s:Envelope/s:Header", &namespaces).unwrap(), 0);
    }

    #[test]
    fn test_keyword_local_names() {
        let (mut doc, namespaces) = parse(
            r#"<root xmlns="urn:x"><child/><div/><div/><parent><and/></parent></root>"#,
        );
        assert_eq!(count(&mut doc, "/ns98:root/ns98:child", &namespaces).unwrap(), 1);
        assert_eq!(count(&mut doc, "//ns98:div", &namespaces).unwrap(), 2);
        assert_eq!(count(&mut doc, "//ns98:parent/ns98:and", &namespaces).unwrap(), 1);

        let nodes = select(&mut doc, "//ns98:div[2]", &namespaces).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(doc.node_path(nodes[0]), "/*/*[3]");
    }

    #[test]
    fn test_keyword_local_name_needs_matching_namespace() {
        let (mut doc, namespaces) =
            parse(r#"<root xmlns="urn:x"><div/><div xmlns="urn:y"/></root>"#);
        assert_eq!(count(&mut doc, "//ns98:div", &namespaces).unwrap(), 1);
        assert_eq!(count(&mut doc, "//ns99:div", &namespaces).unwrap(), 1);
    }

    #[test]
    fn test_count_unknown_prefix_is_error() {
        let (mut doc, namespaces) = parse("<root/>");
        let err = count(&mut doc, "/nope:root", &namespaces).unwrap_err();
        assert!(matches!(
            err,
            Error::XPath {
                operation: Operation::Count,
                ..
            }
        ));
    }
}
