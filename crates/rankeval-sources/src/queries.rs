//! Newline-delimited query lists.

use rankeval_core::ranking::Query;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
#[error("failed to read query file {}: {source}", path.display())]
pub struct QueryFileError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Read one query per line from `path`.
///
/// See [`parse_queries`] for the normalisation applied.
///
/// # Errors
///
/// Returns [`QueryFileError`] if the file cannot be opened or read.
pub fn read_queries(path: &Path) -> Result<Vec<Query>, QueryFileError> {
    let wrap = |source| QueryFileError {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(wrap)?;
    parse_queries(BufReader::new(file)).map_err(wrap)
}

/// Collect queries from `reader`: trailing whitespace (including `\r`) is
/// trimmed, blank lines are skipped, and a repeated query keeps only its
/// first position.
///
/// # Errors
///
/// Propagates read failures from `reader`, including invalid UTF-8.
pub fn parse_queries(reader: impl BufRead) -> io::Result<Vec<Query>> {
    let mut seen = HashSet::new();
    let mut queries = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let query = line.trim_end();
        if query.trim_start().is_empty() {
            continue;
        }
        if seen.insert(query.to_string()) {
            queries.push(query.to_string());
        } else {
            tracing::debug!(query, "duplicate query ignored");
        }
    }

    Ok(queries)
}
