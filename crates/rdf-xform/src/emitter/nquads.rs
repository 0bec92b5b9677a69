use std::io::Write;

use crate::error::Result;
use crate::model::Triple;
use crate::store::TripleSink;

/// N-Quads sink. Streams each batch as `<s> <p> <o> <g> .` lines.
pub struct NQuadsEmitter<W: Write> {
    writer: W,
    count: u64,
}

impl<W: Write> NQuadsEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Number of quads written so far.
    pub fn quad_count(&self) -> u64 {
        self.count
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TripleSink for NQuadsEmitter<W> {
    fn write_batch(&mut self, graph: &str, triples: &[Triple]) -> Result<()> {
        for triple in triples {
            writeln!(
                self.writer,
                "{} <{}> {} <{graph}> .",
                triple.subject, triple.predicate, triple.object
            )?;
            self.count += 1;
        }
        Ok(())
    }
}
