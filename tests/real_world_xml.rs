//! Integration tests qualifying real-world XML formats.
//!
//! The fixtures under `tests/resources/` cover SOAP envelopes, HL7 CDA,
//! Atom feeds, XHTML-style markup, an XHTML page with a document type
//! declaration, an ISO-8859-1 document and mixed default namespaces. For every
//! one of them each qualified path must match at least one node when
//! counted back against the document.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::rstest;

use xml2xpath::qualify::{MatchCount, XPATH_ALL_NODES};
use xml2xpath::report::{render, Mode};
use xml2xpath::{qualify_file, Error, QualifyOptions};

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(name)
}

// --- Round-trip soundness ---

#[rstest]
#[case::soap("soap.xml")]
#[case::hl7("HL7.xml")]
#[case::html("test.html")]
#[case::catalog("catalog.xml")]
#[case::atom("feed.xml")]
#[case::xhtml_doctype("xhtml.xml")]
#[case::latin1("latin1.xml")]
fn test_every_qualified_path_matches(#[case] name: &str) {
    let options = QualifyOptions::default().with_match_counts(true);
    let (_, run) = qualify_file(resource(name), &options)
        .unwrap_or_else(|e| panic!("{name}: qualification failed: {e}"));

    assert!(!run.table.is_empty(), "{name}: empty table");
    for (raw, record) in run.table.iter() {
        match record.match_count {
            Some(MatchCount::Found(n)) => {
                assert!(n >= 1, "{name}: {raw} -> {} matches nothing", record.qualified_path);
            }
            other => panic!("{name}: {raw} has no count: {other:?}"),
        }
    }
    assert!(run.diagnostics.is_empty(), "{name}: {:?}", run.diagnostics);
}

#[rstest]
#[case::soap("soap.xml")]
#[case::catalog("catalog.xml")]
fn test_all_nodes_selection_is_sound(#[case] name: &str) {
    let options = QualifyOptions::default()
        .start_expression(XPATH_ALL_NODES)
        .with_match_counts(true);
    let (_, run) = qualify_file(resource(name), &options).unwrap();
    assert!(run.table.values().all(|r| r.is_sound()));
}

// --- SOAP ---

#[test]
fn test_soap_incident_start() {
    let options = QualifyOptions::default()
        .start_expression(r#"//*[local-name()="incident"]"#)
        .with_match_counts(true);
    let (_, run) = qualify_file(resource("soap.xml"), &options).unwrap();
    let keys: Vec<_> = run
        .table
        .keys()
        .filter(|&k| k != "/soap:Envelope/soap:Body")
        .collect();
    assert_eq!(keys, vec!["/soap:Envelope/soap:Body/*"]);
}

#[test]
fn test_soap_report_all() {
    let (_, run) = qualify_file(resource("soap.xml"), &QualifyOptions::default()).unwrap();
    let lines = render(&run.table, Mode::All);
    assert_eq!(
        lines,
        vec![
            "/soap:Envelope",
            "/soap:Envelope/soap:Header",
            "/soap:Envelope/soap:Body",
            "/soap:Envelope/soap:Body/ns98:incident",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:id",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:summary",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:summary/@priority",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:notes",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:notes/ns98:note",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:notes/ns98:note/@author",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:notes/ns98:note",
            "/soap:Envelope/soap:Body/ns98:incident/ns98:notes/ns98:note/@author",
        ]
    );
}

// --- HL7 CDA ---

#[test]
fn test_hl7_namespaces() {
    let (_, run) = qualify_file(resource("HL7.xml"), &QualifyOptions::default()).unwrap();
    let pairs: Vec<_> = run.namespaces.iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("urn:hl7-org:v3", "ns98"),
            ("http://www.w3.org/2001/XMLSchema-instance", "xsi"),
            ("urn:hl7-org:sdtc", "sdtc"),
        ]
    );
}

#[test]
fn test_hl7_extension_element_keeps_prefix() {
    let (_, run) = qualify_file(resource("HL7.xml"), &QualifyOptions::default()).unwrap();
    let record = run
        .table
        .get("/*/*[5]/*/*[2]/sdtc:raceCode")
        .unwrap();
    assert_eq!(
        record.qualified_path,
        "/ns98:ClinicalDocument/ns98:recordTarget/ns98:patientRole/ns98:patient/sdtc:raceCode"
    );
    assert_eq!(record.attribute_names, Some(vec!["code".to_string()]));
}

// --- Plain markup ---

#[test]
fn test_html_paths_are_already_qualified() {
    let (_, run) = qualify_file(resource("test.html"), &QualifyOptions::default()).unwrap();
    assert!(run.namespaces.is_empty());
    for (raw, record) in run.table.iter() {
        assert_eq!(raw, record.qualified_path);
    }
    assert!(run.table.contains("/html/body/div/p[2]"));
}

// --- XHTML with a document type declaration ---

#[test]
fn test_xhtml_keyword_elements_are_counted() {
    let options = QualifyOptions::default().with_match_counts(true);
    let (_, run) = qualify_file(resource("xhtml.xml"), &options).unwrap();

    let content = run.table.get("/*/*[2]/*").unwrap();
    assert_eq!(content.qualified_path, "/ns98:html/ns98:body/ns98:div");
    assert_eq!(content.match_count, Some(MatchCount::Found(1)));
    assert_eq!(content.attribute_names, Some(vec!["id".to_string()]));

    let section = run.table.get("/*/*[2]/*/*[3]").unwrap();
    assert_eq!(
        section.qualified_path,
        "/ns98:html/ns98:body/ns98:div/ns98:div"
    );
    assert_eq!(section.match_count, Some(MatchCount::Found(2)));
}

#[test]
fn test_xhtml_div_start_expression() {
    let options = QualifyOptions::default()
        .start_expression("//ns98:div")
        .with_match_counts(true);
    let (_, run) = qualify_file(resource("xhtml.xml"), &options).unwrap();
    let keys: Vec<_> = run.table.keys().collect();
    assert_eq!(keys, vec!["/*/*[2]/*", "/*/*[2]/*/*[2]", "/*/*[2]/*/*[3]"]);
    assert!(run.table.values().all(|r| r.is_sound()));
}

// --- Legacy encodings ---

#[test]
fn test_latin1_names_and_attributes() {
    let options = QualifyOptions::default().with_match_counts(true);
    let (_, run) = qualify_file(resource("latin1.xml"), &options).unwrap();

    let article = run.table.get("/*/*[1]").unwrap();
    assert_eq!(article.qualified_path, "/ns98:catalogue/ns98:article");
    assert_eq!(article.attribute_names, Some(vec!["r\u{e9}f".to_string()]));

    let name = run.table.get("/*/*[2]/*[1]").unwrap();
    assert_eq!(
        name.qualified_path,
        "/ns98:catalogue/ns98:article/ns98:d\u{e9}signation"
    );
    assert_eq!(name.match_count, Some(MatchCount::Found(2)));
}

// --- Mixed content ---

#[test]
fn test_catalog_non_element_nodes() {
    let options = QualifyOptions::default().start_expression(XPATH_ALL_NODES);
    let (_, run) = qualify_file(resource("catalog.xml"), &options).unwrap();
    let non_elements: Vec<_> = run
        .table
        .iter()
        .filter(|(_, r)| !r.is_element())
        .map(|(raw, _)| raw)
        .collect();
    assert_eq!(
        non_elements,
        vec![
            "/comment()",
            "/*/processing-instruction('render')",
            "/*/comment()",
        ]
    );
}

// --- Missing input ---

#[test]
fn test_missing_file() {
    let err = qualify_file(resource("absent.xml"), &QualifyOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }));
}
