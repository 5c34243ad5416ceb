//! Character encoding detection and decoding of raw document bytes.
//!
//! The encoding is taken from, in order:
//!
//! 1. a byte order mark (UTF-8, UTF-16 LE/BE),
//! 2. the `encoding` pseudo-attribute of the XML declaration, read as ASCII,
//! 3. UTF-8, the XML default.
//!
//! Labels are resolved with `encoding_rs`, so `ISO-8859-1` decodes as its
//! `windows-1252` superset, as browsers and most XML tools do.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::Error;

/// The XML declaration must appear within this many bytes to be honored.
const DECLARATION_SCAN_LIMIT: usize = 200;

/// Decodes `bytes` into text, stripping any byte order mark.
///
/// # Errors
///
/// Returns [`Error::Encoding`] when the declared encoding is unknown or the
/// bytes are malformed for the detected encoding.
pub(crate) fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, Error> {
    let (encoding, content) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?.unwrap_or(UTF_8), bytes),
    };
    tracing::trace!(encoding = encoding.name(), "decoding document");
    encoding
        .decode_without_bom_handling_and_without_replacement(content)
        .ok_or_else(|| Error::Encoding(format!("malformed {} input", encoding.name())))
}

/// Reads the `encoding` pseudo-attribute of a leading XML declaration.
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>, Error> {
    let Some(label) = declaration_label(bytes) else {
        return Ok(None);
    };
    let encoding = Encoding::for_label(label)
        .ok_or_else(|| Error::Encoding(format!("unsupported encoding `{}`", label.escape_ascii())))?;
    // A declaration readable as ASCII rules out UTF-16 without a byte order
    // mark, so the bytes are in some ASCII-compatible form of Unicode.
    if encoding == UTF_16LE || encoding == UTF_16BE {
        return Ok(Some(UTF_8));
    }
    Ok(Some(encoding))
}

fn declaration_label(bytes: &[u8]) -> Option<&[u8]> {
    let scan = &bytes[..bytes.len().min(DECLARATION_SCAN_LIMIT)];
    if !scan.starts_with(b"<?xml") {
        return None;
    }
    let end = scan.windows(2).position(|w| w == b"?>")?;
    let decl = &scan[..end];

    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = trim_ascii_start(&decl[at + 8..]);
    let rest = trim_ascii_start(rest.strip_prefix(b"=")?);
    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let len = rest.iter().position(|&b| b == quote)?;
    Some(&rest[..len])
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_without_declaration_is_borrowed() {
        let decoded = decode(b"<root/>").unwrap();
        assert!(matches!(decoded, Cow::Borrowed("<root/>")));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        assert_eq!(decode(b"\xEF\xBB\xBF<root/>").unwrap(), "<root/>");
    }

    #[test]
    fn test_declared_latin1() {
        let decoded =
            decode(b"<?xml version=\"1.0\" encoding='ISO-8859-1'?><p>caf\xe9</p>").unwrap();
        assert!(decoded.ends_with("<p>caf\u{e9}</p>"));
    }

    #[test]
    fn test_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<a>\u{e9}</a>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode(&bytes).unwrap(), "<a>\u{e9}</a>");
    }

    #[test]
    fn test_declared_utf16_without_bom_reads_as_utf8() {
        let decoded = decode(b"<?xml version=\"1.0\" encoding=\"UTF-16\"?><a/>").unwrap();
        assert!(decoded.ends_with("<a/>"));
    }

    #[test]
    fn test_unknown_encoding() {
        let err = decode(b"<?xml version=\"1.0\" encoding=\"x-klingon\"?><a/>").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to decode document: unsupported encoding `x-klingon`"
        );
    }

    #[test]
    fn test_malformed_utf8() {
        let err = decode(b"<a>\xff</a>").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to decode document: malformed UTF-8 input"
        );
    }
}
