//! File-based sinks for dry runs.

pub mod nquads;

pub use nquads::NQuadsEmitter;
