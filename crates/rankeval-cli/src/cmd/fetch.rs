//! `rankeval fetch`: pull one side's rankings and print the batch.

use crate::output::{OutputMode, fail};
use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use rankeval_core::config::RankevalConfig;
use rankeval_core::error::ErrorCode;
use rankeval_core::ranking::Query;
use rankeval_core::{RankingBatch, timing};
use rankeval_sources::queries::read_queries;
use rankeval_sources::{RankingSource, SolrSource, WikiSource, fetch_rankings};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// MediaWiki search API.
    Reference,
    /// Solr request handler.
    Candidate,
}

impl SourceKind {
    const fn unavailable_code(self) -> ErrorCode {
        match self {
            Self::Reference => ErrorCode::ReferenceSourceFailed,
            Self::Candidate => ErrorCode::CandidateSourceFailed,
        }
    }
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Which side to fetch.
    #[arg(long, value_enum)]
    pub source: SourceKind,

    /// Newline-delimited query file.
    #[arg(long, value_name = "PATH")]
    pub queries: PathBuf,

    /// Write the batch here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

pub fn build_source(kind: SourceKind, config: &RankevalConfig) -> Box<dyn RankingSource> {
    match kind {
        SourceKind::Reference => Box::new(WikiSource::new(&config.reference, &config.fetch)),
        SourceKind::Candidate => Box::new(SolrSource::new(
            &config.candidate,
            &config.fetch,
            &config.reference.user_agent,
        )),
    }
}

pub fn load_queries(path: &Path, output: OutputMode) -> Result<Vec<Query>> {
    read_queries(path).map_err(|e| fail(output, ErrorCode::QueryFileUnreadable, e.into()))
}

/// Fetch every query from `kind`. Fails only when nothing came back at all.
pub fn fetch_side(
    kind: SourceKind,
    queries: &[Query],
    config: &RankevalConfig,
    output: OutputMode,
) -> Result<RankingBatch> {
    let source = build_source(kind, config);
    let batch = fetch_rankings(source.as_ref(), queries, config.fetch.max_in_flight);

    if batch.is_empty() && !queries.is_empty() {
        let err = anyhow::anyhow!(
            "no {} ranking could be fetched for {} queries",
            source.name(),
            queries.len()
        );
        return Err(fail(output, kind.unavailable_code(), err));
    }

    Ok(batch)
}

/// Serialize `batch` as pretty JSON to `path`.
pub fn write_batch(path: &Path, batch: &RankingBatch) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, batch)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub fn run_fetch(args: &FetchArgs, output: OutputMode, config: &RankevalConfig) -> Result<()> {
    let queries = load_queries(&args.queries, output)?;
    let batch = timing::timed("fetch.batch", || {
        fetch_side(args.source, &queries, config, output)
    })?;

    match &args.output {
        Some(path) => {
            write_batch(path, &batch).map_err(|e| fail(output, ErrorCode::OutputWriteFailed, e))?;
            info!(path = %path.display(), "wrote ranking batch");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &batch)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
