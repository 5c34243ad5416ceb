//! Document type declarations in the prolog.
//!
//! The tree builder refuses any `<!DOCTYPE ...>`. A declaration without an
//! internal subset (`<!DOCTYPE html>`, or one naming only an external DTD)
//! contributes nothing to the tree, so it is cut out before parsing. A
//! declaration with an internal subset `[...]` is kept and therefore
//! rejected: its entities and attribute defaults would change the document.

use std::borrow::Cow;

/// Removes a document type declaration without internal subset from the
/// prolog of `input`.
pub(crate) fn strip_doctype(input: &str) -> Cow<'_, str> {
    match doctype_span(input) {
        Some((start, end)) => {
            tracing::debug!(
                declaration = &input[start..end],
                "skipping document type declaration"
            );
            let mut stripped = String::with_capacity(input.len() - (end - start));
            stripped.push_str(&input[..start]);
            stripped.push_str(&input[end..]);
            Cow::Owned(stripped)
        }
        None => Cow::Borrowed(input),
    }
}

/// Byte range of the declaration, if the prolog holds one that can be cut.
fn doctype_span(input: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    loop {
        let rest = &input[pos..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\u{feff}');
        pos += rest.len() - trimmed.len();
        if trimmed.starts_with("<?") {
            pos += trimmed.find("?>")? + 2;
        } else if trimmed.starts_with("<!--") {
            pos += trimmed.find("-->")? + 3;
        } else if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<!doctype") {
            break;
        } else {
            return None;
        }
    }

    // Quoted system and public literals may contain `>` and `[`.
    let start = pos;
    let mut quote = None;
    for (offset, b) in input[start..].bytes().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'[') => return None,
            (None, b'>') => return Some((start, start + offset + 1)),
            _ => {}
        }
    }
    None
}
