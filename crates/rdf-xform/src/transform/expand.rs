//! Expand literals into IRIs or cross-reference annotations.

use super::RowTransformer;
use crate::error::Result;
use crate::model::iri;
use crate::model::vocab::XrefPredicates;
use crate::model::{ResultRow, Term, Triple};
use crate::registry::{PrefixOverrides, PrefixRegistry};
use crate::resolver::{resolve, Resolution};
use crate::store::{ObjectFilter, Selection};

/// Keyword selecting registry-based resolution.
pub const INFER: &str = "infer";

/// How a selected value is rewritten.
#[derive(Debug, Clone)]
pub enum ExpandMode {
    /// Resolve `prefix:id` values through the registry.
    Infer {
        registry: PrefixRegistry,
        overrides: PrefixOverrides,
    },
    /// Prepend a fixed IRI prefix.
    Manual(String),
    /// Re-emit the value as a plain literal.
    Coerce,
}

impl ExpandMode {
    pub fn infer(registry: PrefixRegistry) -> Self {
        ExpandMode::Infer {
            registry,
            overrides: PrefixOverrides::standard(),
        }
    }

    /// Interpret a `uriExpansion` setting. The registry loader only runs for
    /// `"infer"`, and its failure aborts the run.
    pub fn from_option<F>(uri_expansion: Option<&str>, load_registry: F) -> Result<Self>
    where
        F: FnOnce() -> Result<PrefixRegistry>,
    {
        Ok(match uri_expansion {
            Some(INFER) => ExpandMode::infer(load_registry()?),
            Some(prefix) => ExpandMode::Manual(prefix.to_string()),
            None => ExpandMode::Coerce,
        })
    }
}

/// Expand the values of `property` on instances of `class`.
#[derive(Debug, Clone)]
pub struct Expand {
    class: String,
    property: String,
    mode: ExpandMode,
    predicates: XrefPredicates,
    delete: bool,
}

impl Expand {
    pub fn new(class: impl Into<String>, property: impl Into<String>, mode: ExpandMode) -> Self {
        let property = property.into();
        Self {
            class: class.into(),
            predicates: XrefPredicates::new(&property, None),
            property,
            mode,
            delete: false,
        }
    }

    /// Mint `x-` predicates under `prefix` instead of the property namespace.
    pub fn with_predicate_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        self.predicates = XrefPredicates::new(&self.property, Some(prefix.as_str()));
        self
    }

    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    pub fn mode(&self) -> &ExpandMode {
        &self.mode
    }

    fn base_selection(&self) -> Selection {
        Selection::new(&self.class, &self.property, "toExpand")
    }
}

impl RowTransformer for Expand {
    fn name(&self) -> &'static str {
        "expand"
    }

    fn selection(&self) -> Selection {
        let filter = match self.mode {
            ExpandMode::Coerce => ObjectFilter::Any,
            _ => ObjectFilter::Literal,
        };
        self.base_selection().with_filter(filter)
    }

    /// Every statement this run rewrote to a different object or predicate
    /// is removed. Values that come back unchanged under the same predicate
    /// must survive.
    fn deletion(&self) -> Option<Selection> {
        if !self.delete {
            return None;
        }
        let filter = match self.mode {
            // a colon moves the value to an x- predicate, a parenthetical is
            // cut off, and tags or datatypes are dropped
            ExpandMode::Infer { .. } => {
                ObjectFilter::LiteralNotPlainOrContaining(vec![":".into(), "(".into()])
            }
            ExpandMode::Manual(_) => ObjectFilter::Literal,
            ExpandMode::Coerce => ObjectFilter::NotPlainLiteral,
        };
        Some(self.base_selection().with_filter(filter))
    }

    fn transform(&self, row: &ResultRow, graph: &str, out: &mut Vec<Triple>) {
        let raw = row.value.lexical();
        let (predicate, object) = match &self.mode {
            ExpandMode::Manual(prefix) => (row.predicate.clone(), Term::iri(iri::expand(prefix, raw))),
            ExpandMode::Coerce => (row.predicate.clone(), Term::literal(raw)),
            ExpandMode::Infer {
                registry,
                overrides,
            } => match resolve(raw, registry, overrides) {
                Resolution::Expanded { prefix, iri } => {
                    (self.predicates.resolved(&prefix), Term::iri(iri))
                }
                Resolution::Annotated(value) => {
                    (self.predicates.unresolved(), Term::literal(value))
                }
                Resolution::Literal(value) => (row.predicate.clone(), Term::literal(value)),
            },
        };
        out.push(Triple::new(row.subject.clone(), predicate, object, graph));
    }
}
