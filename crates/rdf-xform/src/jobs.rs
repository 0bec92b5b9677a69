//! File-driven runs: split job lists and SPARQL update scripts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::store::TripleStore;
use crate::transform::Split;

/// One line of a split job file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitJob {
    pub class: String,
    pub property: String,
    pub delimiter: char,
}

impl SplitJob {
    /// File-driven splits always honour `"` quoting and delete the originals.
    pub fn transformer(&self) -> Split {
        Split::new(&self.class, &self.property, self.delimiter)
            .with_quote(Some('"'))
            .with_delete(true)
    }
}

/// Strip one pair of surrounding double quotes from a TSV field.
fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// Parse tab-separated `class, property, delimiter` rows. Blank lines and
/// `#` comments are skipped.
pub fn parse_split_jobs(content: &str, path: &Path) -> Result<Vec<SplitJob>> {
    let mut jobs = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let bad = |reason: &str| Error::Job {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: reason.to_string(),
        };
        let fields: Vec<&str> = line.split('\t').map(unquote).collect();
        if fields.len() < 3 {
            return Err(bad("expected class, property and delimiter separated by tabs"));
        }
        let delimiter = fields[2]
            .chars()
            .next()
            .ok_or_else(|| bad("empty delimiter"))?;
        if fields[0].is_empty() || fields[1].is_empty() {
            return Err(bad("empty class or property"));
        }
        jobs.push(SplitJob {
            class: fields[0].to_string(),
            property: fields[1].to_string(),
            delimiter,
        });
    }
    Ok(jobs)
}

/// Read a split job file. A missing file yields no jobs.
pub fn read_split_jobs(path: &Path) -> Result<Vec<SplitJob>> {
    if !path.exists() {
        warn!(path = %path.display(), "split file does not exist");
        return Ok(Vec::new());
    }
    info!(path = %path.display(), "reading split file");
    let content = fs::read_to_string(path)?;
    parse_split_jobs(&content, path)
}

#[derive(Debug, Deserialize)]
struct UpdateScript {
    queries: Vec<String>,
}

fn is_query_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("rq") | Some("sparql")
    )
}

/// Query files below `dir`, depth first with siblings in name order.
/// Symlinked directories are not entered.
fn collect_query_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_dir() && is_query_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Load update strings from a YAML document (`queries: [...]`), from every
/// `.rq` / `.sparql` file below a directory (in name order), or from a
/// single query file.
pub fn load_update_scripts(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "input file \"{}\" does not exist",
            path.display()
        )));
    }
    if path.is_dir() {
        return collect_query_files(path)?
            .iter()
            .map(|f| fs::read_to_string(f).map_err(Error::from))
            .collect();
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            let content = fs::read_to_string(path)?;
            let script: UpdateScript = serde_yaml::from_str(&content)?;
            Ok(script.queries)
        }
        _ => Ok(vec![fs::read_to_string(path)?]),
    }
}

/// Execute updates in order, stopping at the first failure.
pub fn run_updates(store: &dyn TripleStore, queries: &[String]) -> Result<usize> {
    for (idx, query) in queries.iter().enumerate() {
        info!(index = idx + 1, total = queries.len(), "executing update");
        store.update(query)?;
    }
    Ok(queries.len())
}
