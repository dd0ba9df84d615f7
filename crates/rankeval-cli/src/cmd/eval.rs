//! `rankeval eval`: fetch both sides for a query list and score them.

use super::fetch::{SourceKind, fetch_side, load_queries, write_batch};
use super::{ReportView, render_report};
use crate::output::{OutputMode, fail};
use anyhow::{Context as _, Result};
use clap::Args;
use rankeval_core::config::RankevalConfig;
use rankeval_core::error::ErrorCode;
use rankeval_core::{RankingBatch, RankingEvaluator, timing};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const REFERENCE_FILE: &str = "reference.json";
pub const CANDIDATE_FILE: &str = "candidate.json";

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Newline-delimited query file.
    #[arg(long, value_name = "PATH")]
    pub queries: PathBuf,

    /// Also write reference.json and candidate.json into this directory.
    #[arg(long, value_name = "DIR")]
    pub save_rankings: Option<PathBuf>,

    /// Override `[evaluation].depth`.
    #[arg(long)]
    pub depth: Option<usize>,

    /// Override `[fetch].max_in_flight` (0 = one worker per query).
    #[arg(long)]
    pub max_in_flight: Option<usize>,
}

fn save_rankings(dir: &Path, reference: &RankingBatch, candidate: &RankingBatch) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    write_batch(&dir.join(REFERENCE_FILE), reference)?;
    write_batch(&dir.join(CANDIDATE_FILE), candidate)?;
    info!(dir = %dir.display(), "saved rankings");
    Ok(())
}

pub fn run_eval(args: &EvalArgs, output: OutputMode, config: &RankevalConfig) -> Result<()> {
    let policy = super::with_depth(config.evaluation, args.depth, output)?;
    let mut config = config.clone();
    if let Some(max_in_flight) = args.max_in_flight {
        config.fetch.max_in_flight = max_in_flight;
    }

    let queries = load_queries(&args.queries, output)?;
    info!(queries = queries.len(), path = %args.queries.display(), "loaded queries");

    // Reference first, then candidate; each side fans out on its own.
    let reference = timing::timed("eval.fetch_reference", || {
        fetch_side(SourceKind::Reference, &queries, &config, output)
    })?;
    let candidate = timing::timed("eval.fetch_candidate", || {
        fetch_side(SourceKind::Candidate, &queries, &config, output)
    })?;

    if let Some(dir) = &args.save_rankings {
        save_rankings(dir, &reference, &candidate)
            .map_err(|e| fail(output, ErrorCode::OutputWriteFailed, e))?;
    }

    let report = timing::timed("eval.evaluate", || {
        RankingEvaluator::new(policy).evaluate(&reference, &candidate)
    });

    render_report(output, &ReportView::new(&policy, &report))
}
