//! Positional node paths.
//!
//! Builds the absolute path a tree engine reports for a node, following the
//! libxml2 conventions:
//!
//! - an element in a default namespace has no usable name in `XPath`, so it
//!   is written `*` and indexed among all of its element siblings;
//! - a prefixed element is written `prefix:local`, an element in no namespace
//!   `local`, and both are indexed among siblings with the same name;
//! - comments are `comment()`, text is `text()`, processing instructions are
//!   `processing-instruction('target')`;
//! - an index `[n]` is only written when a sibling of the same kind exists.

use xot::{Node, ValueType, Xot};

/// Returns the positional absolute path of `node`.
pub(crate) fn node_path(xot: &Xot, node: Node) -> String {
    let mut steps = Vec::new();
    let mut current = Some(node);

    while let Some(cur) = current {
        let step = match xot.value_type(cur) {
            ValueType::Document => break,
            ValueType::Element => element_step(xot, cur),
            ValueType::Text => indexed("text()", position(xot, cur, |n| xot.is_text(n))),
            ValueType::Comment => indexed("comment()", position(xot, cur, |n| xot.is_comment(n))),
            ValueType::ProcessingInstruction => {
                let target = pi_target(xot, cur).unwrap_or_default();
                let name = format!("processing-instruction('{target}')");
                indexed(&name, position(xot, cur, |n| pi_target(xot, n) == Some(target)))
            }
            ValueType::Attribute => match xot.attribute_node(cur) {
                Some(attribute) => format!("@{}", qualified(xot, cur, attribute.name())),
                None => "@".to_string(),
            },
            ValueType::Namespace => match xot.namespace_node(cur) {
                Some(namespace) => format!("namespace::{}", xot.prefix_str(namespace.prefix())),
                None => "namespace::".to_string(),
            },
        };
        steps.push(step);
        current = xot.parent(cur);
    }

    if steps.is_empty() {
        return "/".to_string();
    }

    steps.iter().rev().fold(String::new(), |mut path, step| {
        path.push('/');
        path.push_str(step);
        path
    })
}

/// How an element step is written and which siblings count towards its index.
#[derive(Debug, PartialEq, Eq)]
enum ElementName {
    /// Default-namespace element, written `*`.
    Generic,
    /// Written as-is: `local` or `prefix:local`.
    Named(String),
}

fn element_name(xot: &Xot, node: Node) -> Option<ElementName> {
    let element = xot.element(node)?;
    let name = element.name();
    let local = xot.local_name_str(name);
    let namespace = xot.namespace_for_name(name);
    if xot.namespace_str(namespace).is_empty() {
        return Some(ElementName::Named(local.to_string()));
    }
    match xot.prefix_for_namespace(node, namespace) {
        Some(prefix) if !xot.prefix_str(prefix).is_empty() => Some(ElementName::Named(format!(
            "{}:{local}",
            xot.prefix_str(prefix)
        ))),
        _ => Some(ElementName::Generic),
    }
}

fn element_step(xot: &Xot, node: Node) -> String {
    let Some(name) = element_name(xot, node) else {
        return "*".to_string();
    };
    let namespace = element_namespace(xot, node);
    match name {
        ElementName::Generic => indexed("*", position(xot, node, |n| xot.is_element(n))),
        ElementName::Named(ref written) => {
            let index = position(xot, node, |n| {
                element_namespace(xot, n) == namespace
                    && element_name(xot, n).as_ref() == Some(&name)
            });
            indexed(written, index)
        }
    }
}

fn element_namespace(xot: &Xot, node: Node) -> Option<xot::NamespaceId> {
    xot.element(node)
        .map(|element| xot.namespace_for_name(element.name()))
}

fn qualified(xot: &Xot, node: Node, name: xot::NameId) -> String {
    let (local, uri) = xot.name_ns_str(name);
    if uri.is_empty() {
        return local.to_string();
    }
    match xot.prefix_for_namespace(node, xot.namespace_for_name(name)) {
        Some(prefix) if !xot.prefix_str(prefix).is_empty() => {
            format!("{}:{local}", xot.prefix_str(prefix))
        }
        _ => local.to_string(),
    }
}

fn pi_target(xot: &Xot, node: Node) -> Option<&str> {
    xot.processing_instruction(node)
        .map(|pi| xot.local_name_str(pi.target()))
}

/// 1-based index of `node` among the siblings accepted by `same_kind`, or
/// `None` when it has no such sibling.
fn position(xot: &Xot, node: Node, same_kind: impl Fn(Node) -> bool) -> Option<usize> {
    let preceding = xot
        .preceding_siblings(node)
        .filter(|&n| n != node && same_kind(n))
        .count();
    if preceding > 0 {
        return Some(preceding + 1);
    }
    xot.following_siblings(node)
        .any(|n| n != node && same_kind(n))
        .then_some(1)
}

fn indexed(name: &str, index: Option<usize>) -> String {
    match index {
        Some(index) => format!("{name}[{index}]"),
        None => name.to_string(),
    }
}
