//! Bounded accumulation of output triples, flushed to a [`TripleSink`].

use tracing::{debug, info};

use crate::error::Result;
use crate::model::Triple;
use crate::store::TripleSink;

/// Counters reported once a writer is done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Triples handed to the sink.
    pub triples_written: u64,
    /// `write_batch` calls issued.
    pub writes: u64,
}

/// Buffers triples per target graph and writes them in bulk.
///
/// When the buffered count reaches `buffer_size` the whole buffer is written,
/// one call per graph, and cleared. [`final_flush`](Self::final_flush)
/// writes the remainder and consumes the writer, so it runs exactly once.
/// Nothing spans batches: a failure on one write leaves earlier ones in place.
pub struct BatchWriter<S: TripleSink> {
    sink: S,
    buffer_size: usize,
    pending: Vec<(String, Vec<Triple>)>,
    buffered: usize,
    stats: WriteStats,
}

impl<S: TripleSink> BatchWriter<S> {
    /// `buffer_size` is clamped to at least 1.
    pub fn new(sink: S, buffer_size: usize) -> Self {
        Self {
            sink,
            buffer_size: buffer_size.max(1),
            pending: Vec::new(),
            buffered: 0,
            stats: WriteStats::default(),
        }
    }

    pub fn add(&mut self, triple: Triple) {
        match self.pending.iter_mut().find(|(g, _)| *g == triple.graph) {
            Some((_, triples)) => triples.push(triple),
            None => self.pending.push((triple.graph.clone(), vec![triple])),
        }
        self.buffered += 1;
    }

    /// Number of triples waiting to be written.
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    pub fn flush_if_needed(&mut self) -> Result<()> {
        if self.buffered >= self.buffer_size {
            self.flush()?;
            info!(written = self.stats.triples_written, "updated triples");
        }
        Ok(())
    }

    /// Write whatever is left and return the totals.
    pub fn final_flush(mut self) -> Result<WriteStats> {
        self.flush()?;
        info!(written = self.stats.triples_written, "total updated triples");
        Ok(self.stats)
    }

    fn flush(&mut self) -> Result<()> {
        for (graph, triples) in self.pending.drain(..) {
            debug!(graph = %graph, count = triples.len(), "writing batch");
            self.sink.write_batch(&graph, &triples)?;
            self.stats.triples_written += triples.len() as u64;
            self.stats.writes += 1;
        }
        self.buffered = 0;
        Ok(())
    }
}
