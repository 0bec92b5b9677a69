//! Prefix registry: namespace prefix to base IRI, loaded from a JSON-LD
//! context document such as `http://prefix.cc/context`.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Lowercase and strip whitespace so lookups ignore case and spacing.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Immutable mapping from normalised prefix to base IRI.
#[derive(Debug, Clone, Default)]
pub struct PrefixRegistry {
    entries: HashMap<String, String>,
}

impl PrefixRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a context document: `{ "@context": { "prefix": "iri", ... } }`.
    pub fn from_context_json(document: &str) -> Result<Self> {
        Self::from_context_json_at(document, "<inline>")
    }

    /// Read a context document from a local file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let location = path.display().to_string();
        let document = std::fs::read_to_string(path).map_err(|e| Error::RegistryUnavailable {
            location: location.clone(),
            reason: e.to_string(),
        })?;
        Self::from_context_json_at(&document, &location)
    }

    /// Fetch a context document over HTTP.
    pub fn load(url: &str, http: &HttpConfig) -> Result<Self> {
        info!(url, "fetching prefix registry");
        let unavailable = |reason: String| Error::RegistryUnavailable {
            location: url.to_string(),
            reason,
        };
        let document = http
            .agent()
            .get(url)
            .set("Accept", "application/ld+json, application/json")
            .call()
            .map_err(|e| unavailable(e.to_string()))?
            .into_string()
            .map_err(|e| unavailable(e.to_string()))?;
        Self::from_context_json_at(&document, url)
    }

    fn from_context_json_at(document: &str, location: &str) -> Result<Self> {
        let unavailable = |reason: &str| Error::RegistryUnavailable {
            location: location.to_string(),
            reason: reason.to_string(),
        };
        let root: Value =
            serde_json::from_str(document).map_err(|e| unavailable(&e.to_string()))?;
        let context = root
            .get("@context")
            .and_then(Value::as_object)
            .ok_or_else(|| unavailable("document has no top-level @context object"))?;

        let mut registry = Self::empty();
        for (prefix, base) in context {
            let base = base
                .as_str()
                .ok_or_else(|| unavailable(&format!("value for prefix '{prefix}' is not a string")))?;
            registry.insert(prefix, base);
        }
        info!(entries = registry.len(), "prefix registry loaded");
        Ok(registry)
    }

    pub fn insert(&mut self, prefix: &str, base: impl Into<String>) {
        self.entries.insert(normalize_prefix(prefix), base.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(&normalize_prefix(prefix)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identifier prefixes whose registry entry lives under a different name.
const STANDARD_OVERRIDES: &[(&str, &str)] = &[
    ("keggcompound", "kegg"),
    ("keggdrug", "kegg"),
    ("drugbank", "drugbank"),
    ("uniprotkb", "uniprot"),
    ("clinicaltrials.gov", "clinicaltrials"),
    ("drugsproductdatabase(dpd)", "dpd"),
    ("nationaldrugcodedirectory", "ndc"),
    ("therapeutictargetsdatabase", "ttd"),
    ("fdadruglabelatdailymed", "dailymed"),
    ("chebi:chebi", "chebi"),
    ("pubchemcompound", "b2rpubchem"),
];

/// Corrections applied to a normalised prefix before registry lookup.
#[derive(Debug, Clone, Default)]
pub struct PrefixOverrides {
    table: HashMap<String, String>,
}

impl PrefixOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut overrides = Self::none();
        for (from, to) in STANDARD_OVERRIDES {
            overrides.insert(from, to);
        }
        overrides
    }

    pub fn insert(&mut self, from: &str, to: &str) {
        self.table.insert(normalize_prefix(from), normalize_prefix(to));
    }

    /// The substituted prefix, or the input when no override exists.
    pub fn apply<'a>(&'a self, prefix: &'a str) -> &'a str {
        self.table.get(prefix).map(String::as_str).unwrap_or(prefix)
    }
}
