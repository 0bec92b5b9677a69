//! Contracts for the external triple store, and the selection patterns the
//! transforms read and delete through.

pub mod memory;
pub mod sparql;
pub mod tsv;

use crate::error::Result;
use crate::model::term::escape_literal;
use crate::model::vocab::standard;
use crate::model::{ResultRow, Term, Triple};

/// Restriction on the object of a selected statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectFilter {
    Any,
    Iri,
    Literal,
    /// Literals whose value contains the needle.
    LiteralContaining(String),
    /// Literals that carry a language tag or a non-`xsd:string` datatype,
    /// or whose value contains any of the needles.
    LiteralNotPlainOrContaining(Vec<String>),
    /// Every object except a plain literal.
    NotPlainLiteral,
}

impl ObjectFilter {
    pub fn matches(&self, object: &Term) -> bool {
        match self {
            ObjectFilter::Any => true,
            ObjectFilter::Iri => object.is_iri(),
            ObjectFilter::Literal => object.is_literal(),
            ObjectFilter::LiteralContaining(needle) => {
                object.is_literal() && object.lexical().contains(needle.as_str())
            }
            ObjectFilter::LiteralNotPlainOrContaining(needles) => {
                object.is_literal()
                    && (!object.is_plain_literal()
                        || needles.iter().any(|n| object.lexical().contains(n.as_str())))
            }
            ObjectFilter::NotPlainLiteral => !object.is_plain_literal(),
        }
    }

    fn to_sparql(&self, var: &str) -> String {
        match self {
            ObjectFilter::Any => String::new(),
            ObjectFilter::Iri => format!(" FILTER(isIRI(?{var}))"),
            ObjectFilter::Literal => format!(" FILTER(isLiteral(?{var}))"),
            ObjectFilter::LiteralContaining(needle) => format!(
                " FILTER(isLiteral(?{var}) && CONTAINS(STR(?{var}), \"{}\"))",
                escape_literal(needle)
            ),
            ObjectFilter::LiteralNotPlainOrContaining(needles) => {
                let mut tests = vec![not_plain(var)];
                tests.extend(needles.iter().map(|n| {
                    format!("CONTAINS(STR(?{var}), \"{}\")", escape_literal(n))
                }));
                format!(" FILTER(isLiteral(?{var}) && ({}))", tests.join(" || "))
            }
            ObjectFilter::NotPlainLiteral => {
                format!(" FILTER(!isLiteral(?{var}) || {})", not_plain(var))
            }
        }
    }
}

/// Tag or datatype test for a literal bound to `var`.
fn not_plain(var: &str) -> String {
    format!(
        "LANG(?{var}) != \"\" || DATATYPE(?{var}) != <{}>",
        standard::XSD_STRING
    )
}

/// Statements `?s ?p ?o` in any graph `?g` where `?s a <class>`,
/// `?p = <property>` and the object passes `filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub class: String,
    pub property: String,
    /// Result variable bound to the object.
    pub value_var: &'static str,
    pub filter: ObjectFilter,
}

impl Selection {
    pub fn new(class: impl Into<String>, property: impl Into<String>, value_var: &'static str) -> Self {
        Self {
            class: class.into(),
            property: property.into(),
            value_var,
            filter: ObjectFilter::Any,
        }
    }

    pub fn with_filter(mut self, filter: ObjectFilter) -> Self {
        self.filter = filter;
        self
    }

    fn pattern(&self, var: &str) -> String {
        format!(
            "GRAPH ?g {{ ?s a <{}> ; ?p ?{var} . FILTER(?p = <{}>){} }}",
            self.class,
            self.property,
            self.filter.to_sparql(var)
        )
    }

    /// SELECT query binding `s`, `p`, the value variable and `g`.
    pub fn select_query(&self) -> String {
        format!(
            "SELECT ?s ?p ?{var} ?g WHERE {{ {} }}",
            self.pattern(self.value_var),
            var = self.value_var
        )
    }

    /// DELETE removing every matching statement in one operation.
    pub fn delete_update(&self) -> String {
        format!(
            "DELETE {{ GRAPH ?g {{ ?s ?p ?o }} }} WHERE {{ {} }}",
            self.pattern("o")
        )
    }

    /// True for `?s rdf:type <class>` statements.
    pub(crate) fn is_class_assertion(&self, triple: &Triple) -> bool {
        triple.predicate == standard::RDF_TYPE
            && matches!(&triple.object, Term::Iri(iri) if *iri == self.class)
    }
}

/// Pull-based stream of selection rows. `close` releases the underlying
/// connection and must be safe to call more than once.
pub trait ResultStream {
    fn next_row(&mut self) -> Result<Option<ResultRow>>;
    fn close(&mut self);
}

/// Receiver of bulk writes; one call is all-or-nothing.
pub trait TripleSink {
    fn write_batch(&mut self, graph: &str, triples: &[Triple]) -> Result<()>;
}

/// A store that can be read, written and pattern-deleted.
pub trait TripleStore {
    fn select(&self, selection: &Selection) -> Result<Box<dyn ResultStream + '_>>;
    fn insert(&self, graph: &str, triples: &[Triple]) -> Result<()>;
    fn delete(&self, selection: &Selection) -> Result<()>;
    /// Execute an arbitrary SPARQL update.
    fn update(&self, sparql: &str) -> Result<()>;
}

impl<T: TripleStore + ?Sized> TripleSink for &T {
    fn write_batch(&mut self, graph: &str, triples: &[Triple]) -> Result<()> {
        (**self).insert(graph, triples)
    }
}

impl<S: TripleSink + ?Sized> TripleSink for &mut S {
    fn write_batch(&mut self, graph: &str, triples: &[Triple]) -> Result<()> {
        (**self).write_batch(graph, triples)
    }
}

/// Closes the wrapped stream when dropped, whatever the exit path.
pub struct ScopedStream<'a> {
    inner: Box<dyn ResultStream + 'a>,
}

impl<'a> ScopedStream<'a> {
    pub fn new(inner: Box<dyn ResultStream + 'a>) -> Self {
        Self { inner }
    }

    pub fn next_row(&mut self) -> Result<Option<ResultRow>> {
        self.inner.next_row()
    }
}

impl Drop for ScopedStream<'_> {
    fn drop(&mut self) {
        self.inner.close();
    }
}
