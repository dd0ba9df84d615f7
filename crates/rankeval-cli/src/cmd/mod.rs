pub mod eval;
pub mod fetch;
pub mod index;
pub mod score;

use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode};
use rankeval_core::error::ErrorCode;
use rankeval_core::ranking::Query;
use rankeval_core::{BatchSummary, EvaluationReport, ScoreBatch, ScoringPolicy};
use serde::Serialize;
use std::io::{self, Write};

/// What `eval` and `score` print: the policy used plus the report.
#[derive(Debug, Serialize)]
pub struct ReportView<'a> {
    pub policy: &'a ScoringPolicy,
    pub scores: &'a ScoreBatch,
    pub skipped: &'a [Query],
    pub summary: &'a BatchSummary,
}

impl<'a> ReportView<'a> {
    pub fn new(policy: &'a ScoringPolicy, report: &'a EvaluationReport) -> Self {
        Self {
            policy,
            scores: &report.scores,
            skipped: &report.skipped,
            summary: &report.summary,
        }
    }
}

/// Apply a `--depth` override on top of the configured policy.
pub fn with_depth(
    policy: ScoringPolicy,
    depth: Option<usize>,
    output: OutputMode,
) -> anyhow::Result<ScoringPolicy> {
    match depth {
        Some(0) => Err(fail(
            output,
            ErrorCode::InvalidArgument,
            anyhow::anyhow!("--depth must be at least 1"),
        )),
        Some(depth) => Ok(ScoringPolicy { depth, ..policy }),
        None => Ok(policy),
    }
}

pub fn render_report(output: OutputMode, view: &ReportView<'_>) -> anyhow::Result<()> {
    render_mode(output, view, write_report_text, write_report_pretty)
}

fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.4}"))
}

fn write_report_text(view: &ReportView<'_>, w: &mut dyn Write) -> io::Result<()> {
    for (query, score) in view.scores.iter() {
        writeln!(w, "{query}\t{score:.6}")?;
    }
    for query in view.skipped {
        writeln!(w, "{query}\tskipped")?;
    }
    writeln!(w, "mean\t{}", fmt_score(view.summary.mean))
}

fn write_report_pretty(view: &ReportView<'_>, w: &mut dyn Write) -> io::Result<()> {
    let heading = format!("NDCG@{}", view.policy.depth);
    pretty_section(w, &heading)?;
    if view.scores.is_empty() {
        writeln!(w, "(no queries scored)")?;
    }
    for (query, score) in view.scores.iter() {
        writeln!(w, "  {score:.4}  {query}")?;
    }

    if !view.skipped.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Skipped (missing from one source)")?;
        for query in view.skipped {
            writeln!(w, "  {query}")?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Summary")?;
    pretty_kv(w, "evaluated", view.summary.evaluated.to_string())?;
    pretty_kv(w, "skipped", view.summary.skipped.to_string())?;
    pretty_kv(w, "mean", fmt_score(view.summary.mean))?;
    pretty_kv(w, "min", fmt_score(view.summary.min))?;
    pretty_kv(w, "max", fmt_score(view.summary.max))?;
    pretty_kv(
        w,
        "policy",
        format!("{:?} gain, {:?} discount", view.policy.gain, view.policy.discount),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankeval_core::{Ranking, RankingBatch, RankingEvaluator};

    fn ranking(titles: &[&str]) -> Ranking {
        titles.iter().copied().collect()
    }

    fn sample_report() -> (ScoringPolicy, EvaluationReport) {
        let reference: RankingBatch = [
            ("apple", ranking(&["A", "B", "C"])),
            ("pear", ranking(&["P"])),
        ]
        .into_iter()
        .collect();
        let candidate: RankingBatch = [("apple", ranking(&["C", "B", "A"]))]
            .into_iter()
            .collect();
        let policy = ScoringPolicy::default();
        let report = RankingEvaluator::new(policy).evaluate(&reference, &candidate);
        (policy, report)
    }

    #[test]
    fn depth_override_replaces_only_depth() {
        let policy = ScoringPolicy::default();
        let overridden = with_depth(policy, Some(5), OutputMode::Text).expect("valid depth");
        assert_eq!(overridden.depth, 5);
        assert_eq!(overridden.gain, policy.gain);
        assert_eq!(
            with_depth(policy, None, OutputMode::Text).expect("no override"),
            policy
        );
        assert!(with_depth(policy, Some(0), OutputMode::Text).is_err());
    }

    #[test]
    fn text_report_lists_scores_skips_and_mean() {
        let (policy, report) = sample_report();
        let view = ReportView::new(&policy, &report);
        let mut buf = Vec::new();
        write_report_text(&view, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.starts_with("apple\t0.7"), "{text}");
        assert!(text.contains("pear\tskipped"));
        assert!(text.trim_end().ends_with(&format!("mean\t{}", fmt_score(report.summary.mean))));
    }

    #[test]
    fn pretty_report_has_heading_and_summary() {
        let (policy, report) = sample_report();
        let view = ReportView::new(&policy, &report);
        let mut buf = Vec::new();
        write_report_pretty(&view, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.starts_with("NDCG@20"));
        assert!(text.contains("Skipped"));
        assert!(text.contains("evaluated:   1"));
    }

    #[test]
    fn json_view_exposes_policy_and_summary() {
        let (policy, report) = sample_report();
        let value = serde_json::to_value(ReportView::new(&policy, &report)).expect("json");
        assert_eq!(value["policy"]["depth"], 20);
        assert_eq!(value["policy"]["gain"], "linear");
        assert_eq!(value["summary"]["evaluated"], 1);
        assert_eq!(value["skipped"][0], "pear");
        assert!(value["scores"]["apple"].is_number());
    }
}
