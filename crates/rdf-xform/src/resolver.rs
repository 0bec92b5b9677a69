//! Resolve compact `prefix:id` identifiers found in literals.
//!
//! Resolution is a pure function of the raw value and a registry snapshot.

use crate::model::iri;
use crate::registry::{normalize_prefix, PrefixOverrides, PrefixRegistry};

/// Outcome of resolving one raw literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The prefix is known; `iri` is the registry base joined with the id.
    Expanded { prefix: String, iri: String },
    /// Looks like `prefix:id` but the prefix is unknown.
    Annotated(String),
    /// Not a compound identifier.
    Literal(String),
}

/// Drop a parenthetical suffix such as `"12345 (estimate)"`.
fn strip_parenthetical(raw: &str) -> &str {
    match raw.find('(') {
        Some(pos) => &raw[..pos],
        None => raw,
    }
}

/// Split `value` into prefix and id. Values mentioning `url` split at the
/// first colon, everything else at the last one.
fn split_identifier(value: &str) -> Option<(&str, &str)> {
    let pos = if value.contains("url") {
        value.find(':')?
    } else {
        value.rfind(':')?
    };
    Some((&value[..pos], &value[pos + 1..]))
}

/// Surrounding whitespace, such as the space left before a stripped
/// parenthetical, is trimmed from the id before it is joined onto the base.
pub fn resolve(raw: &str, registry: &PrefixRegistry, overrides: &PrefixOverrides) -> Resolution {
    let value = strip_parenthetical(raw);
    let Some((prefix, id)) = split_identifier(value) else {
        return Resolution::Literal(value.to_string());
    };

    let normalized = normalize_prefix(prefix);
    let prefix = overrides.apply(&normalized);
    match registry.get(prefix) {
        Some(base) => Resolution::Expanded {
            prefix: prefix.to_string(),
            iri: iri::expand(base, id.trim()),
        },
        None => Resolution::Annotated(value.to_string()),
    }
}
