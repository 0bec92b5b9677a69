//! Vocabulary constants and cross-reference predicate derivation.
//!
//! - `rdf:` / `xsd:` standard namespaces
//! - `x-ref` for identifiers whose prefix is unknown to the registry
//! - `x-<prefix>` for identifiers resolved through the registry

/// Standard RDF/XSD namespace URIs
pub mod standard {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// Cross-reference predicate naming
pub mod xref {
    /// Local name of the fallback predicate for unresolved identifiers.
    pub const REF: &str = "x-ref";
    /// Local name prefix of predicates for resolved identifiers.
    pub const PREFIX: &str = "x-";
}

/// Mints `x-ref` and `x-<prefix>` predicates for one run.
///
/// With an explicit predicate prefix the local name is appended to it.
/// Otherwise the property IRI is cut after its last `/` and the local name is
/// appended there, so `http://ex.org/vocab/xref` yields
/// `http://ex.org/vocab/x-drugbank`.
#[derive(Debug, Clone)]
pub struct XrefPredicates {
    base: String,
}

impl XrefPredicates {
    pub fn new(property: &str, predicate_prefix: Option<&str>) -> Self {
        let base = match predicate_prefix {
            Some(prefix) => prefix.to_string(),
            None => match property.rfind('/') {
                Some(pos) => property[..=pos].to_string(),
                None => String::new(),
            },
        };
        Self { base }
    }

    /// Predicate for an identifier resolved under `prefix`.
    pub fn resolved(&self, prefix: &str) -> String {
        format!("{}{}{}", self.base, xref::PREFIX, prefix)
    }

    /// Predicate for an identifier the registry could not resolve.
    pub fn unresolved(&self) -> String {
        format!("{}{}", self.base, xref::REF)
    }
}
