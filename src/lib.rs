//! # xml2xpath
//!
//! Derives a namespace-qualified `XPath` expression for every selected node
//! of an XML document, including documents that mix default namespaces,
//! prefixes, comments and processing instructions.
//!
//! ## Quick Start
//!
//! ```
//! use xml2xpath::{qualify_str, QualifyOptions};
//!
//! let xml = r#"<s:Envelope xmlns:s="urn:soap">
//!   <s:Body><incident xmlns="urn:incident"><id>7</id></incident></s:Body>
//! </s:Envelope>"#;
//!
//! let (_, run) = qualify_str(xml, &QualifyOptions::default()).unwrap();
//! let incident = run.table.get("/s:Envelope/s:Body/*").unwrap();
//! assert_eq!(incident.qualified_path, "/s:Envelope/s:Body/ns98:incident");
//! ```

pub mod document;
pub mod error;
pub mod namespace;
pub mod qualify;
pub mod report;
pub mod xpath;

// Re-export primary types at the crate root for convenience.
pub use document::{Document, NodeId};
pub use error::{Diagnostic, Error};
pub use namespace::NamespaceMap;
pub use qualify::{
    qualify, qualify_bytes, qualify_file, qualify_str, QualifiedRecord, Qualification,
    QualifyOptions, ResultTable,
};
