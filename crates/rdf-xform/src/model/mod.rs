pub mod iri;
pub mod term;
pub mod vocab;

pub use term::{ResultRow, Term, Triple};
