//! Split delimited literals into one triple per fragment.

use super::RowTransformer;
use crate::error::{Error, Result};
use crate::model::{ResultRow, Term, Triple};
use crate::store::{ObjectFilter, Selection};

/// Split `value` at every `delimiter` that is not inside a quoted field.
/// Without a quote character every delimiter is a split point. Empty
/// fragments are kept.
pub fn split_fields(value: &str, delimiter: char, quote: Option<char>) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in value.char_indices() {
        if Some(c) == quote {
            quoted = !quoted;
        } else if c == delimiter && !quoted {
            fragments.push(&value[start..i]);
            start = i + c.len_utf8();
        }
    }
    fragments.push(&value[start..]);
    fragments
}

/// Remove one leading and one trailing `quote`, if present.
pub fn strip_quotes(fragment: &str, quote: char) -> &str {
    let fragment = fragment.strip_prefix(quote).unwrap_or(fragment);
    fragment.strip_suffix(quote).unwrap_or(fragment)
}

/// Split the values of `property` on instances of `class`.
#[derive(Debug, Clone)]
pub struct Split {
    class: String,
    property: String,
    delimiter: char,
    quote: Option<char>,
    delete: bool,
}

impl Split {
    pub fn new(class: impl Into<String>, property: impl Into<String>, delimiter: char) -> Self {
        Self {
            class: class.into(),
            property: property.into(),
            delimiter,
            quote: None,
            delete: false,
        }
    }

    pub fn with_quote(mut self, quote: Option<char>) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Only literals containing the delimiter; anything else would be a
    /// no-op split.
    fn delimited(&self) -> Selection {
        Selection::new(&self.class, &self.property, "toSplit")
            .with_filter(ObjectFilter::LiteralContaining(self.delimiter.to_string()))
    }

    /// The fragments `value` splits into, quotes stripped.
    pub fn fragments<'a>(&self, value: &'a str) -> Vec<&'a str> {
        let fragments = split_fields(value, self.delimiter, self.quote);
        match self.quote {
            Some(q) => fragments.into_iter().map(|f| strip_quotes(f, q)).collect(),
            None => fragments,
        }
    }
}

impl RowTransformer for Split {
    fn name(&self) -> &'static str {
        "split"
    }

    fn selection(&self) -> Selection {
        self.delimited()
    }

    fn validate(&self) -> Result<()> {
        if Some(self.delimiter) == self.quote {
            return Err(Error::Config(format!(
                "delimiter and quote must differ, both are '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    fn deletion(&self) -> Option<Selection> {
        self.delete.then(|| self.delimited())
    }

    fn transform(&self, row: &ResultRow, graph: &str, out: &mut Vec<Triple>) {
        for fragment in self.fragments(row.value.lexical()) {
            out.push(Triple::new(
                row.subject.clone(),
                row.predicate.clone(),
                Term::literal(fragment),
                graph,
            ));
        }
    }
}
