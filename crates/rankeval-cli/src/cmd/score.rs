//! `rankeval score`: offline NDCG over two saved ranking batches.

use super::{ReportView, render_report};
use crate::output::{OutputMode, fail};
use anyhow::{Context as _, Result};
use clap::Args;
use rankeval_core::error::ErrorCode;
use rankeval_core::{RankingBatch, RankingEvaluator, ScoringPolicy, timing};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Reference batch: JSON object of query -> ordered titles.
    #[arg(long, value_name = "PATH")]
    pub reference: PathBuf,

    /// Candidate batch in the same format.
    #[arg(long, value_name = "PATH")]
    pub candidate: PathBuf,

    /// Override `[evaluation].depth`.
    #[arg(long)]
    pub depth: Option<usize>,
}

/// Read a batch previously written by `fetch` or `eval --save-rankings`.
pub fn load_batch(path: &Path) -> Result<RankingBatch> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn run_score(args: &ScoreArgs, output: OutputMode, policy: ScoringPolicy) -> Result<()> {
    let policy = super::with_depth(policy, args.depth, output)?;

    let reference =
        load_batch(&args.reference).map_err(|e| fail(output, ErrorCode::RankingFileInvalid, e))?;
    let candidate =
        load_batch(&args.candidate).map_err(|e| fail(output, ErrorCode::RankingFileInvalid, e))?;

    let report = timing::timed("score.evaluate", || {
        RankingEvaluator::new(policy).evaluate(&reference, &candidate)
    });

    render_report(output, &ReportView::new(&policy, &report))
}
