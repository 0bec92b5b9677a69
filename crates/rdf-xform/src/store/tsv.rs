//! SPARQL 1.1 TSV results (`text/tab-separated-values`).
//!
//! The first line names the variables (`?s\t?p\t?o`); every following line
//! holds one solution with terms in Turtle/N-Triples syntax and empty fields
//! for unbound variables. Rows are parsed lazily, one line per call.

use std::io::BufRead;

use super::ResultStream;
use crate::error::{Error, Result};
use crate::model::vocab::standard;
use crate::model::{ResultRow, Term};

/// Parse one TSV field. `Ok(None)` means unbound.
pub fn parse_term(field: &str) -> Result<Option<Term>> {
    let field = field.trim_end_matches('\r');
    if field.is_empty() {
        return Ok(None);
    }
    if let Some(rest) = field.strip_prefix('<') {
        let iri = rest
            .strip_suffix('>')
            .ok_or_else(|| Error::stream(format!("unterminated IRI: {field}")))?;
        return Ok(Some(Term::iri(iri)));
    }
    if let Some(label) = field.strip_prefix("_:") {
        return Ok(Some(Term::blank(label)));
    }
    if field.starts_with('"') {
        return parse_quoted(field).map(Some);
    }
    parse_bare(field).map(Some)
}

fn parse_quoted(field: &str) -> Result<Term> {
    let mut value = String::new();
    let mut chars = field.char_indices().skip(1);
    let mut end = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                end = Some(i + 1);
                break;
            }
            '\\' => {
                let (_, esc) = chars
                    .next()
                    .ok_or_else(|| Error::stream(format!("dangling escape: {field}")))?;
                match esc {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    '"' | '\'' | '\\' => value.push(esc),
                    'u' | 'U' => {
                        let len = if esc == 'u' { 4 } else { 8 };
                        let hex: String = (0..len).filter_map(|_| chars.next().map(|(_, h)| h)).collect();
                        let ch = u32::from_str_radix(&hex, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or_else(|| Error::stream(format!("bad unicode escape in {field}")))?;
                        value.push(ch);
                    }
                    other => {
                        return Err(Error::stream(format!("unknown escape \\{other} in {field}")))
                    }
                }
            }
            c => value.push(c),
        }
    }
    let end = end.ok_or_else(|| Error::stream(format!("unterminated literal: {field}")))?;

    let suffix = &field[end..];
    if suffix.is_empty() {
        Ok(Term::literal(value))
    } else if let Some(lang) = suffix.strip_prefix('@') {
        Ok(Term::lang_literal(value, lang))
    } else if let Some(dt) = suffix
        .strip_prefix("^^<")
        .and_then(|s| s.strip_suffix('>'))
    {
        Ok(Term::typed_literal(value, dt))
    } else {
        Err(Error::stream(format!("unexpected literal suffix: {field}")))
    }
}

/// Numbers and booleans may appear without quotes.
fn parse_bare(field: &str) -> Result<Term> {
    let datatype = if field == "true" || field == "false" {
        "boolean"
    } else if field.parse::<i64>().is_ok() {
        "integer"
    } else if field.contains(['e', 'E']) && field.parse::<f64>().is_ok() {
        "double"
    } else if field.parse::<f64>().is_ok() {
        "decimal"
    } else {
        return Err(Error::stream(format!("unrecognised term: {field}")));
    };
    Ok(Term::typed_literal(
        field,
        format!("{}{datatype}", standard::XSD),
    ))
}

struct Columns {
    subject: usize,
    predicate: usize,
    value: usize,
    graph: usize,
}

/// Lazily parsed TSV result stream over any buffered reader.
pub struct TsvResultStream<R: BufRead> {
    reader: Option<R>,
    columns: Columns,
    value_var: String,
    line: String,
    line_no: usize,
}

impl<R: BufRead> TsvResultStream<R> {
    /// Read the header line and locate `s`, `p`, `value_var` and `g`.
    pub fn new(mut reader: R, value_var: &str) -> Result<Self> {
        let mut header = String::new();
        reader
            .read_line(&mut header)
            .map_err(|e| Error::stream(format!("reading result header: {e}")))?;
        let names: Vec<&str> = header
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(|name| name.trim_start_matches(['?', '$']))
            .collect();
        let position = |var: &str| {
            names
                .iter()
                .position(|name| *name == var)
                .ok_or_else(|| Error::stream(format!("result header lacks ?{var}: {}", header.trim_end())))
        };
        let columns = Columns {
            subject: position("s")?,
            predicate: position("p")?,
            value: position(value_var)?,
            graph: position("g")?,
        };
        Ok(Self {
            reader: Some(reader),
            columns,
            value_var: value_var.to_string(),
            line: String::new(),
            line_no: 1,
        })
    }

    fn parse_row(&self) -> Result<ResultRow> {
        let fields: Vec<&str> = self.line.trim_end_matches(['\r', '\n']).split('\t').collect();
        let term = |idx: usize, var: &str| -> Result<Term> {
            let field = fields.get(idx).copied().unwrap_or("");
            parse_term(field)?.ok_or_else(|| {
                Error::stream(format!("line {}: ?{var} is unbound", self.line_no))
            })
        };
        let iri = |idx: usize, var: &str| -> Result<String> {
            match term(idx, var)? {
                Term::Iri(iri) => Ok(iri),
                other => Err(Error::stream(format!(
                    "line {}: ?{var} is not an IRI: {other}",
                    self.line_no
                ))),
            }
        };
        Ok(ResultRow::new(
            term(self.columns.subject, "s")?,
            iri(self.columns.predicate, "p")?,
            term(self.columns.value, &self.value_var)?,
            iri(self.columns.graph, "g")?,
        ))
    }
}

impl<R: BufRead> ResultStream for TsvResultStream<R> {
    fn next_row(&mut self) -> Result<Option<ResultRow>> {
        loop {
            let Some(reader) = self.reader.as_mut() else {
                return Ok(None);
            };
            self.line.clear();
            let read = reader
                .read_line(&mut self.line)
                .map_err(|e| Error::stream(format!("line {}: {e}", self.line_no + 1)))?;
            if read == 0 {
                self.close();
                return Ok(None);
            }
            self.line_no += 1;
            if self.line.trim().is_empty() {
                continue;
            }
            return self.parse_row().map(Some);
        }
    }

    fn close(&mut self) {
        self.reader = None;
    }
}
