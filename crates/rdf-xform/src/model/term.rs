//! RDF terms, quads and result rows.

use std::fmt;

use super::vocab::standard;

/// An RDF term as it appears in a result row or an output triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// A plain (`xsd:string`) literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        // xsd:string is the implicit datatype of plain literals
        let datatype = (datatype != standard::XSD_STRING).then_some(datatype);
        Term::Literal {
            value: value.into(),
            datatype,
            language: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    /// The lexical form: IRI text, blank node label, or literal value.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::BlankNode(label) => label,
            Term::Literal { value, .. } => value,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// A literal with neither a language tag nor a datatype other than
    /// `xsd:string`.
    pub fn is_plain_literal(&self) -> bool {
        match self {
            Term::Literal {
                datatype, language, ..
            } => {
                language.is_none()
                    && datatype.as_deref().map_or(true, |dt| dt == standard::XSD_STRING)
            }
            _ => false,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }
}

/// Escape a string for an N-Triples / SPARQL quoted literal.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            _ => out.push(c),
        }
    }
    out
}

/// N-Triples syntax, which is also valid inside SPARQL `INSERT DATA`.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(label) => write!(f, "_:{label}"),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A statement together with the named graph it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
    pub graph: String,
}

impl Triple {
    pub fn new(
        subject: Term,
        predicate: impl Into<String>,
        object: Term,
        graph: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
            graph: graph.into(),
        }
    }
}

/// One binding of a selection query: subject, predicate, the raw value to
/// transform, and the graph the statement was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub subject: Term,
    pub predicate: String,
    pub value: Term,
    pub graph: String,
}

impl ResultRow {
    pub fn new(
        subject: Term,
        predicate: impl Into<String>,
        value: Term,
        graph: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            value,
            graph: graph.into(),
        }
    }
}
