//! Name-test rewriting for the expression lexer.
//!
//! The engine's lexer only joins `prefix:local` into a qualified name when
//! both halves are plain names or one of the reserved function names. A
//! keyword such as `child`, `div`, `and` or `parent` in either half breaks
//! the expression with `XPST0003`, even though `ns98:div` is a perfectly
//! valid name test. The same holds for `*:local` and `Q{uri}local`.
//!
//! Before compiling, such name tests are replaced by the equivalent
//! predicate form
//!
//! ```text
//! ns98:div  ->  *[namespace-uri()='urn:x'][local-name()='div']
//! *:div     ->  *[local-name()='div']
//! ```
//!
//! which selects the same nodes on any axis and keeps positional predicates
//! that follow the step meaningful. Names followed by `(` (function calls)
//! or preceded by `$` (variables) are left alone, as are string literals
//! and prefixes the namespace map does not know. Names inside kind tests
//! such as `element(h:div)` are not recognized as such and get rewritten,
//! which the engine then rejects.

use std::borrow::Cow;

use crate::namespace::NamespaceMap;

/// Keyword tokens of the expression grammar. A name test using one of these
/// as prefix or local part is rewritten.
const KEYWORDS: &[&str] = &[
    "ancestor",
    "ancestor-or-self",
    "and",
    "array",
    "as",
    "attribute",
    "cast",
    "castable",
    "child",
    "comment",
    "descendant",
    "descendant-or-self",
    "div",
    "document-node",
    "element",
    "else",
    "empty-sequence",
    "eq",
    "every",
    "except",
    "following",
    "following-sibling",
    "for",
    "function",
    "ge",
    "gt",
    "idiv",
    "if",
    "in",
    "instance",
    "intersect",
    "is",
    "item",
    "le",
    "let",
    "lt",
    "map",
    "mod",
    "namespace",
    "namespace-node",
    "ne",
    "node",
    "of",
    "or",
    "parent",
    "preceding",
    "preceding-sibling",
    "processing-instruction",
    "return",
    "satisfies",
    "schema-attribute",
    "schema-element",
    "self",
    "some",
    "switch",
    "text",
    "then",
    "to",
    "treat",
    "typeswitch",
    "union",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Rewrites keyword-named name tests in `expression`.
///
/// Returns the input unchanged when nothing needs rewriting.
pub(crate) fn rewrite_name_tests<'a>(
    expression: &'a str,
    namespaces: &NamespaceMap,
) -> Cow<'a, str> {
    let mut scanner = Scanner {
        input: expression,
        pos: 0,
        copied: 0,
        out: String::new(),
        namespaces,
    };
    scanner.run();
    if scanner.copied == 0 {
        Cow::Borrowed(expression)
    } else {
        scanner.out.push_str(&expression[scanner.copied..]);
        Cow::Owned(scanner.out)
    }
}

struct Scanner<'a, 'n> {
    input: &'a str,
    pos: usize,
    /// End of the input prefix already moved to `out`.
    copied: usize,
    out: String,
    namespaces: &'n NamespaceMap,
}

impl<'a> Scanner<'a, '_> {
    fn run(&mut self) {
        while let Some(b) = self.peek_byte() {
            match b {
                b'"' | b'\'' => self.skip_string_literal(b),
                b'$' => {
                    self.pos += 1;
                    self.skip_qname();
                }
                b'Q' if self.peek_byte_at(self.pos + 1) == Some(b'{') => self.uri_qualified_name(),
                b'*' if self.peek_byte_at(self.pos + 1) == Some(b':')
                    && self.peek_byte_at(self.pos + 2).is_some_and(is_name_start_char) =>
                {
                    self.local_name_wildcard();
                }
                b if is_name_start_char(b) => self.prefixed_name(),
                b if is_name_char(b) => self.skip_name(),
                _ => self.pos += 1,
            }
        }
    }

    // --- Name forms ---

    fn prefixed_name(&mut self) {
        let start = self.pos;
        let prefix = self.read_name();
        if !self.at_prefix_colon() {
            return;
        }
        self.pos += 1;
        let local = self.read_name();
        if !(is_keyword(prefix) || is_keyword(local)) || self.at_call() {
            return;
        }
        if let Some(uri) = self.namespaces.uri_for(prefix) {
            let replacement = element_test(Some(uri), local);
            self.replace(start, &replacement);
        }
    }

    fn local_name_wildcard(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let local = self.read_name();
        if is_keyword(local) && !self.at_call() {
            self.replace(start, &element_test(None, local));
        }
    }

    fn uri_qualified_name(&mut self) {
        let input = self.input;
        let start = self.pos;
        let Some(close) = input[start..].find('}') else {
            self.pos = input.len();
            return;
        };
        let uri = &input[start + 2..start + close];
        self.pos += close + 1;
        if !self.peek_byte().is_some_and(is_name_start_char) {
            return;
        }
        let local = self.read_name();
        if is_keyword(local) && !self.at_call() {
            self.replace(start, &element_test(Some(uri), local));
        }
    }

    // --- Skipping ---

    fn skip_string_literal(&mut self, quote: u8) {
        self.pos += 1;
        while let Some(b) = self.peek_byte() {
            self.pos += 1;
            if b == quote {
                // a doubled quote is an escaped quote inside the literal
                if self.peek_byte() == Some(quote) {
                    self.pos += 1;
                } else {
                    return;
                }
            }
        }
    }

    fn skip_qname(&mut self) {
        self.skip_name();
        if self.at_prefix_colon() {
            self.pos += 1;
            self.skip_name();
        }
    }

    fn skip_name(&mut self) {
        while self.peek_byte().is_some_and(is_name_char) {
            self.pos += 1;
        }
    }

    // --- Utility methods ---

    fn read_name(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        self.skip_name();
        &input[start..self.pos]
    }

    /// A single `:` followed by a name; `::` introduces an axis instead.
    fn at_prefix_colon(&self) -> bool {
        self.peek_byte() == Some(b':')
            && self
                .peek_byte_at(self.pos + 1)
                .is_some_and(is_name_start_char)
    }

    /// The name just read is followed by `(`, so it names a function or a
    /// kind test rather than an element.
    fn at_call(&self) -> bool {
        self.input[self.pos..].trim_start().starts_with('(')
    }

    fn replace(&mut self, start: usize, replacement: &str) {
        self.out.push_str(&self.input[self.copied..start]);
        self.out.push_str(replacement);
        self.copied = self.pos;
    }

    fn peek_byte(&self) -> Option<u8> {
        self.peek_byte_at(self.pos)
    }

    fn peek_byte_at(&self, pos: usize) -> Option<u8> {
        self.input.as_bytes().get(pos).copied()
    }
}

fn element_test(uri: Option<&str>, local: &str) -> String {
    match uri {
        Some(uri) => format!(
            "*[namespace-uri()='{}'][local-name()='{local}']",
            uri.replace('\'', "''")
        ),
        None => format!("*[local-name()='{local}']"),
    }
}

/// ASCII letters and `_`; any non-ASCII byte is taken as part of a name so
/// multi-byte characters are never split.
fn is_name_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start_char(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}
