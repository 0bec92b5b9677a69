//! Row transformers: rewrite one selection row into output triples.
//!
//! [`Expand`] and [`Split`] share the pipeline, the batch writer and the
//! post-flush delete stage; they differ only in what they select, emit and
//! delete.

pub mod expand;
pub mod split;

pub use expand::{Expand, ExpandMode};
pub use split::Split;

use crate::error::Result;
use crate::model::{ResultRow, Triple};
use crate::store::Selection;

pub trait RowTransformer {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Statements to read.
    fn selection(&self) -> Selection;

    /// Statements to remove once every batch is flushed, if deletion was
    /// requested.
    fn deletion(&self) -> Option<Selection>;

    /// Reject settings that cannot produce a meaningful run.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Append the triples produced for `row` to `out`, targeting `graph`.
    fn transform(&self, row: &ResultRow, graph: &str, out: &mut Vec<Triple>);
}
