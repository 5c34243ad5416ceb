//! Qualifies a SOAP envelope and prints every expression with its match
//! count.
//!
//! Run with: `cargo run --example qualify_soap`

use xml2xpath::report::{self, Mode};
use xml2xpath::{qualify_str, QualifyOptions};

fn main() {
    let xml = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <getQuote xmlns="urn:example:quotes">
      <symbol exchange="NYSE">ACME</symbol>
      <symbol exchange="LSE">ACME</symbol>
    </getQuote>
  </soap:Body>
</soap:Envelope>"#;

    let options = QualifyOptions::default().with_match_counts(true);
    let (_, run) = match qualify_str(xml, &options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            return;
        }
    };

    println!("Namespaces:");
    for (uri, prefix) in run.namespaces.iter() {
        println!("  {prefix} -> {uri}");
    }

    println!("\nRecords:");
    for line in report::render(&run.table, Mode::Raw) {
        println!("  {line}");
    }

    println!("\nAttribute paths:");
    for line in report::render(&run.table, Mode::All) {
        if line.contains("/@") {
            println!("  {line}");
        }
    }

    for diagnostic in &run.diagnostics {
        eprintln!("{diagnostic}");
    }
}
