//! MediaWiki search API as the reference ranking, and the CirrusSearch dump
//! reader that supplies the documents indexed into the candidate engine.

use crate::http::{build_agent, call_json};
use crate::source::{RankingSource, SourceError};
use rankeval_core::Ranking;
use rankeval_core::config::{FetchConfig, ReferenceConfig};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Reference source
// ---------------------------------------------------------------------------

/// Reference rankings from `action=query&list=search` of a MediaWiki API.
pub struct WikiSource {
    agent: ureq::Agent,
    api_url: String,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

impl WikiSource {
    #[must_use]
    pub fn new(reference: &ReferenceConfig, fetch: &FetchConfig) -> Self {
        Self {
            agent: build_agent(fetch, &reference.user_agent),
            api_url: reference.api_url.clone(),
            limit: reference.limit,
        }
    }
}

impl RankingSource for WikiSource {
    fn name(&self) -> &str {
        "reference"
    }

    fn fetch_ranking(&self, query: &str) -> Result<Ranking, SourceError> {
        let request = self
            .agent
            .get(&self.api_url)
            .query("action", "query")
            .query("list", "search")
            .query("format", "json")
            .query("srlimit", &self.limit.to_string())
            .query("srsearch", query);

        let response: SearchResponse = call_json(&self.api_url, request)?;
        Ok(response.query.search.into_iter().map(|hit| hit.title).collect())
    }
}

// ---------------------------------------------------------------------------
// Dump reader
// ---------------------------------------------------------------------------

/// A page from a CirrusSearch content dump.
///
/// Only the fields mapped into the candidate index are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WikiDocument {
    pub title: String,
    #[serde(default)]
    pub opening_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub popularity_score: Option<f64>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub incoming_links: Option<u64>,
    #[serde(default)]
    pub auxiliary_text: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub redirect: Vec<Redirect>,
    #[serde(default)]
    pub heading: Vec<String>,
    #[serde(default)]
    pub create_timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Redirect {
    pub title: String,
    #[serde(default)]
    pub namespace: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: invalid document: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a newline-delimited dump in Elasticsearch bulk format.
///
/// Action lines (`{"index": {...}}`) are skipped; every other non-blank
/// line must be a document.
///
/// # Errors
///
/// Returns [`DumpError::Io`] if the file cannot be read and
/// [`DumpError::Parse`] for the first line that is not a valid document.
pub fn read_dump(path: &Path) -> Result<Vec<WikiDocument>, DumpError> {
    let io_error = |source| DumpError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_error)?);

    let mut documents = Vec::new();
    let mut actions = 0_usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }

        let parse_error = |source| DumpError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        };
        let value: serde_json::Value = serde_json::from_str(&line).map_err(parse_error)?;

        if value.get("index").is_some() {
            actions += 1;
            continue;
        }

        documents.push(serde_json::from_value(value).map_err(parse_error)?);
    }

    debug!(actions, "skipped bulk action lines");
    info!(path = %path.display(), documents = documents.len(), "read dump");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn search_response_titles_keep_order() {
        let body = r#"{
            "batchcomplete": "",
            "query": {
                "searchinfo": {"totalhits": 3},
                "search": [
                    {"ns": 0, "title": "Rust", "pageid": 1},
                    {"ns": 0, "title": "Rust (programming language)", "pageid": 2},
                    {"ns": 0, "title": "Iron", "pageid": 3}
                ]
            }
        }"#;
        let response: SearchResponse = serde_json::from_str(body).expect("valid body");
        let ranking: Ranking = response.query.search.into_iter().map(|h| h.title).collect();
        assert_eq!(
            ranking.as_slice(),
            ["Rust", "Rust (programming language)", "Iron"]
        );
    }

    #[test]
    fn search_response_without_hits_is_empty() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"query": {"searchinfo": {"totalhits": 0}}}"#)
                .expect("valid body");
        assert!(response.query.search.is_empty());
    }

    #[test]
    fn read_dump_skips_action_lines() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, r#"{{"index":{{"_type":"page","_id":"1"}}}}"#).expect("write");
        writeln!(
            file,
            r#"{{"title":"Apple","opening_text":"An apple is a fruit.","popularity_score":0.5,"category":["Fruit"],"redirect":[{{"namespace":0,"title":"Apples"}}],"incoming_links":12}}"#
        )
        .expect("write");
        writeln!(file).expect("write");
        writeln!(file, r#"{{"index":{{"_type":"page","_id":"2"}}}}"#).expect("write");
        writeln!(file, r#"{{"title":"Banana"}}"#).expect("write");

        let docs = read_dump(file.path()).expect("dump should parse");

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "Apple");
        assert_eq!(docs[0].category, ["Fruit"]);
        assert_eq!(docs[0].redirect[0].title, "Apples");
        assert_eq!(docs[0].incoming_links, Some(12));
        assert_eq!(docs[1].title, "Banana");
        assert!(docs[1].heading.is_empty());
    }

    #[test]
    fn read_dump_reports_line_of_bad_document() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, r#"{{"index":{{}}}}"#).expect("write");
        writeln!(file, r#"{{"no_title": true}}"#).expect("write");

        let err = read_dump(file.path()).expect_err("missing title should fail");
        assert!(matches!(err, DumpError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn read_dump_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = read_dump(&dir.path().join("absent.json")).expect_err("should fail");
        assert!(matches!(err, DumpError::Io { .. }));
    }
}
