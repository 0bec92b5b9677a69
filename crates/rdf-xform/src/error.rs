//! Error taxonomy for transform runs.
//!
//! Every failure aborts the whole invocation; there is no per-row recovery.
//! Variants carry the failing query or document location for diagnosis.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The prefix context document could not be fetched or parsed.
    #[error("prefix registry unavailable at {location}: {reason}")]
    RegistryUnavailable { location: String, reason: String },

    /// The store rejected the selection query.
    #[error("selection rejected by store: {reason}\nquery: {query}")]
    MalformedSelection { query: String, reason: String },

    /// A batch flush was rejected. Earlier batches remain committed.
    #[error("failed to write batch to graph <{graph}>: {reason}")]
    WriteFailure { graph: String, reason: String },

    /// The result stream failed mid-iteration.
    #[error("result stream failed: {reason}")]
    StreamFault { reason: String },

    /// A delete or update script was rejected.
    #[error("update rejected by store: {reason}\nquery: {query}")]
    UpdateFailure { query: String, reason: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A malformed line in a split job file.
    #[error("{}:{line}: {reason}", path.display())]
    Job {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn stream(reason: impl Into<String>) -> Self {
        Error::StreamFault {
            reason: reason.into(),
        }
    }
}
