//! The transform loop: select, rewrite row by row, batch-write, then delete.

use tracing::{debug, info, warn};

use crate::batch::{BatchWriter, WriteStats};
use crate::config::TransformConfig;
use crate::error::Result;
use crate::store::{ScopedStream, TripleSink, TripleStore};
use crate::transform::RowTransformer;

/// What a completed run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub rows: u64,
    pub writes: WriteStats,
    pub deleted: bool,
}

/// Runs transforms against one store, one at a time.
pub struct Pipeline<'a> {
    store: &'a dyn TripleStore,
    config: &'a TransformConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn TripleStore, config: &'a TransformConfig) -> Self {
        Self { store, config }
    }

    /// Write the output back into the store, then run the delete stage if the
    /// transformer asks for one.
    pub fn run(&self, transformer: &dyn RowTransformer) -> Result<TransformReport> {
        let mut sink = self.store;
        self.execute(transformer, &mut sink, true)
    }

    /// Write the output to `sink` instead of the store. The store is only
    /// read; no delete runs.
    pub fn run_into(
        &self,
        transformer: &dyn RowTransformer,
        sink: &mut dyn TripleSink,
    ) -> Result<TransformReport> {
        if transformer.deletion().is_some() {
            warn!("output redirected away from the store, skipping delete");
        }
        self.execute(transformer, sink, false)
    }

    fn execute(
        &self,
        transformer: &dyn RowTransformer,
        sink: &mut dyn TripleSink,
        allow_delete: bool,
    ) -> Result<TransformReport> {
        self.config.validate()?;
        transformer.validate()?;

        let selection = transformer.selection();
        info!(transform = transformer.name(), class = %selection.class, property = %selection.property, "starting transform");
        debug!(query = %selection.select_query(), "selection");

        let mut writer = BatchWriter::new(sink, self.config.buffer_size);
        let mut rows = 0u64;
        let mut produced = Vec::new();

        // The stream is closed by the guard on every exit path, and always
        // before the delete stage.
        {
            let mut stream = ScopedStream::new(self.store.select(&selection)?);
            while let Some(row) = stream.next_row()? {
                rows += 1;
                let graph = self.config.output_graph.as_deref().unwrap_or(&row.graph);
                transformer.transform(&row, graph, &mut produced);
                for triple in produced.drain(..) {
                    writer.add(triple);
                    writer.flush_if_needed()?;
                }
            }
        }
        let writes = writer.final_flush()?;

        let mut deleted = false;
        if allow_delete {
            if let Some(deletion) = transformer.deletion() {
                debug!(update = %deletion.delete_update(), "deleting transformed statements");
                self.store.delete(&deletion)?;
                deleted = true;
            }
        }

        info!(rows, triples = writes.triples_written, writes = writes.writes, deleted, "transform finished");
        Ok(TransformReport {
            rows,
            writes,
            deleted,
        })
    }
}
