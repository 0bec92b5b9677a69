//! In-process quad store implementing the store contracts.
//!
//! Selections are evaluated directly against the stored quads. SPARQL update
//! strings are recorded but not interpreted.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use super::{ResultStream, Selection, TripleStore};
use crate::error::Result;
use crate::model::{ResultRow, Term, Triple};

#[derive(Debug, Default)]
pub struct MemoryStore {
    quads: RefCell<BTreeSet<Triple>>,
    updates: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, triple: Triple) {
        self.quads.borrow_mut().insert(triple);
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.quads.borrow().contains(triple)
    }

    pub fn len(&self) -> usize {
        self.quads.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.borrow().is_empty()
    }

    /// Snapshot of every stored quad, in sorted order.
    pub fn triples(&self) -> Vec<Triple> {
        self.quads.borrow().iter().cloned().collect()
    }

    /// Update strings received through [`TripleStore::update`].
    pub fn executed_updates(&self) -> Vec<String> {
        self.updates.borrow().clone()
    }

    fn matching(&self, selection: &Selection) -> Vec<Triple> {
        let quads = self.quads.borrow();
        let typed: HashSet<(&Term, &str)> = quads
            .iter()
            .filter(|t| selection.is_class_assertion(t))
            .map(|t| (&t.subject, t.graph.as_str()))
            .collect();
        quads
            .iter()
            .filter(|t| t.predicate == selection.property)
            .filter(|t| typed.contains(&(&t.subject, t.graph.as_str())))
            .filter(|t| selection.filter.matches(&t.object))
            .cloned()
            .collect()
    }
}

struct SnapshotStream {
    rows: VecDeque<ResultRow>,
}

impl ResultStream for SnapshotStream {
    fn next_row(&mut self) -> Result<Option<ResultRow>> {
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) {
        self.rows.clear();
    }
}

impl TripleStore for MemoryStore {
    fn select(&self, selection: &Selection) -> Result<Box<dyn ResultStream + '_>> {
        let rows = self
            .matching(selection)
            .into_iter()
            .map(|t| ResultRow::new(t.subject, t.predicate, t.object, t.graph))
            .collect();
        Ok(Box::new(SnapshotStream { rows }))
    }

    fn insert(&self, graph: &str, triples: &[Triple]) -> Result<()> {
        let mut quads = self.quads.borrow_mut();
        for triple in triples {
            quads.insert(Triple {
                graph: graph.to_string(),
                ..triple.clone()
            });
        }
        Ok(())
    }

    fn delete(&self, selection: &Selection) -> Result<()> {
        let doomed = self.matching(selection);
        debug!(count = doomed.len(), "deleting from memory store");
        let mut quads = self.quads.borrow_mut();
        for triple in &doomed {
            quads.remove(triple);
        }
        Ok(())
    }

    fn update(&self, sparql: &str) -> Result<()> {
        self.updates.borrow_mut().push(sparql.to_string());
        Ok(())
    }
}
