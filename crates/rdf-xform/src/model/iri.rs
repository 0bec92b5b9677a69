//! IRI minting for expanded identifiers.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters not allowed inside a SPARQL `IRIREF`.
/// Everything else, `:` and `/` included, is kept as-is so that expanded
/// identifiers stay readable.
const IRIREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Escape an identifier for use after a namespace IRI.
pub fn escape_local(id: &str) -> String {
    utf8_percent_encode(id, IRIREF_ENCODE_SET).to_string()
}

/// Join a namespace IRI and a local identifier.
pub fn expand(base: &str, id: &str) -> String {
    format!("{base}{}", escape_local(id))
}
