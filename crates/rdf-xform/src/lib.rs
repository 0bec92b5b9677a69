//! Expand and split literal values stored in a SPARQL triple store.
//!
//! Rows selected from the store pass through a [`transform::RowTransformer`],
//! the produced triples are written back in bounded batches by
//! [`batch::BatchWriter`], and the original statements are optionally
//! deleted once every batch is flushed. See [`pipeline::Pipeline`].

pub mod batch;
pub mod config;
pub mod emitter;
pub mod error;
pub mod jobs;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod transform;

pub use error::{Error, Result};
