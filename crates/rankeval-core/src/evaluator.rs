//! NDCG evaluation of a candidate ranking against a reference ranking.
//!
//! # Relevance model
//!
//! There are no human relevance judgments. Instead, the reference ranking
//! *is* the judgment: in a reference list of length `L`, the document at
//! 0-indexed position `p` has grade `L - p`. The top reference result gets
//! the highest grade, the last one grade 1, and anything the reference did
//! not return grade 0.
//!
//! # Formulas
//!
//! ```text
//! DCG  = Σ over candidate positions i (1-indexed): gain(grade(doc_i)) * discount(i)
//! IDCG = Σ over reference positions idx (0-indexed): gain(L - idx) * discount(idx + 1)
//! NDCG = DCG / IDCG, or 0 when IDCG == 0
//! ```
//!
//! With the default policy `discount(i) = 1 / log2(i + 1)`, so the ideal term
//! for reference index `idx` is `gain / log2(idx + 2)`.
//!
//! Each list is reduced to its first occurrence of every document before
//! scoring. A repeated title can therefore never earn gain twice, which keeps
//! the score within `[0, 1]`.
//!
//! Gains are summed relative to the top grade ([`Gain::relative`]), which
//! leaves the ratio unchanged and keeps exponential gain finite at any depth.
//!
//! [`Gain::relative`]: crate::policy::Gain::relative

use crate::policy::ScoringPolicy;
use crate::ranking::{DocumentId, Query, RankingBatch, ScoreBatch};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Stateless NDCG evaluator parameterised by a [`ScoringPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingEvaluator {
    policy: ScoringPolicy,
}

/// Aggregate statistics over one evaluated batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Number of queries that received a score.
    pub evaluated: usize,
    /// Number of queries present in only one of the two batches.
    pub skipped: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Scores plus bookkeeping for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub scores: ScoreBatch,
    /// Queries missing from one side, sorted.
    pub skipped: Vec<Query>,
    pub summary: BatchSummary,
}

impl RankingEvaluator {
    #[must_use]
    pub const fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// NDCG of `candidate` measured against `reference`.
    ///
    /// Neither list is truncated here; callers apply the cutoff depth
    /// (see [`evaluate_batch`](Self::evaluate_batch)). Returns 0 for an empty
    /// reference ranking.
    #[must_use]
    pub fn score(&self, reference: &[DocumentId], candidate: &[DocumentId]) -> f64 {
        let reference = first_occurrences(reference);
        let candidate = first_occurrences(candidate);

        let len = reference.len();
        let grades: HashMap<&str, usize> = reference
            .iter()
            .enumerate()
            .map(|(idx, doc)| (*doc, len - idx))
            .collect();

        let gain = self.policy.gain;
        let discount = self.policy.discount;

        let idcg: f64 = (0..len)
            .map(|idx| gain.relative(len - idx, len) * discount.weight(idx + 1))
            .sum();

        // Gains are non-negative, so this only triggers for an empty reference.
        if idcg <= 0.0 {
            return 0.0;
        }

        let dcg: f64 = candidate
            .iter()
            .enumerate()
            .map(|(idx, doc)| {
                let grade = grades.get(doc).copied().unwrap_or(0);
                gain.relative(grade, len) * discount.weight(idx + 1)
            })
            .sum();

        dcg / idcg
    }

    /// Score every query present in both batches, truncating each ranking to
    /// the policy depth first. Queries present on only one side are skipped.
    #[must_use]
    pub fn evaluate_batch(&self, reference: &RankingBatch, candidate: &RankingBatch) -> ScoreBatch {
        let depth = self.policy.depth;

        reference
            .iter()
            .filter_map(|(query, reference_ranking)| {
                let Some(candidate_ranking) = candidate.get(query) else {
                    debug!(query = %query, "no candidate ranking; skipping");
                    return None;
                };
                let score = self.score(reference_ranking.top(depth), candidate_ranking.top(depth));
                Some((query.clone(), score))
            })
            .collect()
    }

    /// [`evaluate_batch`](Self::evaluate_batch) plus skipped queries and
    /// summary statistics.
    #[must_use]
    pub fn evaluate(&self, reference: &RankingBatch, candidate: &RankingBatch) -> EvaluationReport {
        let scores = self.evaluate_batch(reference, candidate);

        let mut skipped: Vec<Query> = reference
            .queries()
            .filter(|q| !candidate.contains(q))
            .chain(candidate.queries().filter(|q| !reference.contains(q)))
            .cloned()
            .collect();
        skipped.sort_unstable();

        let summary = BatchSummary {
            evaluated: scores.len(),
            skipped: skipped.len(),
            mean: scores.mean(),
            min: scores.iter().map(|(_, s)| s).reduce(f64::min),
            max: scores.iter().map(|(_, s)| s).reduce(f64::max),
        };

        info!(
            evaluated = summary.evaluated,
            skipped = summary.skipped,
            mean = summary.mean.unwrap_or_default(),
            "evaluation complete"
        );

        EvaluationReport {
            scores,
            skipped,
            summary,
        }
    }
}

fn first_occurrences(ranking: &[DocumentId]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(ranking.len());
    ranking
        .iter()
        .map(String::as_str)
        .filter(|doc| seen.insert(*doc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Discount, Gain};
    use crate::ranking::Ranking;

    fn docs(items: &[&str]) -> Vec<DocumentId> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn identical_rankings_score_one() {
        let evaluator = RankingEvaluator::default();
        let reference = docs(&["A", "B", "C"]);
        assert_close(evaluator.score(&reference, &reference), 1.0);
    }

    #[test]
    fn reversed_ranking_is_penalised() {
        let evaluator = RankingEvaluator::default();
        let score = evaluator.score(&docs(&["A", "B", "C"]), &docs(&["C", "B", "A"]));

        let dcg = 1.0 + 2.0 / 3f64.log2() + 3.0 / 2.0;
        let idcg = 3.0 + 2.0 / 3f64.log2() + 1.0 / 2.0;
        assert_close(score, dcg / idcg);
        assert!(score < 1.0);
    }

    #[test]
    fn empty_reference_scores_zero() {
        let evaluator = RankingEvaluator::default();
        assert_close(evaluator.score(&[], &docs(&["X"])), 0.0);
        assert_close(evaluator.score(&[], &[]), 0.0);
    }

    #[test]
    fn empty_candidate_scores_zero() {
        let evaluator = RankingEvaluator::default();
        assert_close(evaluator.score(&docs(&["A", "B"]), &[]), 0.0);
    }

    #[test]
    fn unknown_documents_consume_positions_only() {
        let evaluator = RankingEvaluator::default();
        let reference = docs(&["A", "B"]);
        let idcg = 2.0 + 1.0 / 3f64.log2();

        // "X" earns nothing but pushes "A" to position 2.
        let score = evaluator.score(&reference, &docs(&["X", "A"]));
        assert_close(score, (2.0 / 3f64.log2()) / idcg);
    }

    #[test]
    fn repeated_candidate_documents_earn_gain_once() {
        let evaluator = RankingEvaluator::default();
        let score = evaluator.score(&docs(&["A", "B"]), &docs(&["A", "A", "A"]));
        assert!(score <= 1.0);
        assert_close(score, 2.0 / (2.0 + 1.0 / 3f64.log2()));
    }

    #[test]
    fn exponential_gain_and_reciprocal_discount() {
        let evaluator = RankingEvaluator::new(ScoringPolicy {
            gain: Gain::Exponential,
            discount: Discount::Reciprocal,
            ..ScoringPolicy::default()
        });
        let reference = docs(&["A", "B"]);
        // grades A=2 (gain 3), B=1 (gain 1); IDCG = 3/1 + 1/2
        let score = evaluator.score(&reference, &docs(&["B", "A"]));
        assert_close(score, (1.0 + 3.0 / 2.0) / 3.5);
        assert_close(evaluator.score(&reference, &reference), 1.0);
    }

    #[test]
    fn evaluate_batch_skips_one_sided_queries() {
        let evaluator = RankingEvaluator::default();
        let reference: RankingBatch = [
            ("q1", Ranking::from(docs(&["A", "B"]))),
            ("q2", Ranking::from(docs(&["C"]))),
        ]
        .into_iter()
        .collect();
        let candidate: RankingBatch = [("q1", Ranking::from(docs(&["A", "B"])))]
            .into_iter()
            .collect();

        let scores = evaluator.evaluate_batch(&reference, &candidate);
        assert_eq!(scores.len(), 1);
        assert_close(scores.get("q1").unwrap_or_default(), 1.0);
        assert!(!scores.contains("q2"));
    }

    #[test]
    fn evaluate_batch_truncates_to_depth() {
        let evaluator = RankingEvaluator::new(ScoringPolicy {
            depth: 2,
            ..ScoringPolicy::default()
        });
        let reference: RankingBatch = [("q", Ranking::from(docs(&["A", "B", "C"])))]
            .into_iter()
            .collect();
        // Beyond the cutoff the lists differ; within it they agree.
        let candidate: RankingBatch = [("q", Ranking::from(docs(&["A", "B", "Z", "Y"])))]
            .into_iter()
            .collect();

        let scores = evaluator.evaluate_batch(&reference, &candidate);
        assert_close(scores.get("q").unwrap_or_default(), 1.0);
    }

    #[test]
    fn evaluate_reports_skips_from_both_sides() {
        let evaluator = RankingEvaluator::default();
        let reference: RankingBatch = [
            ("shared", Ranking::from(docs(&["A"]))),
            ("ref-only", Ranking::from(docs(&["B"]))),
        ]
        .into_iter()
        .collect();
        let candidate: RankingBatch = [
            ("shared", Ranking::from(docs(&["Z"]))),
            ("cand-only", Ranking::from(docs(&["B"]))),
        ]
        .into_iter()
        .collect();

        let report = evaluator.evaluate(&reference, &candidate);
        assert_eq!(report.skipped, ["cand-only", "ref-only"]);
        assert_eq!(report.summary.evaluated, 1);
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(report.summary.min, Some(0.0));
        assert_eq!(report.summary.max, Some(0.0));
    }

    #[test]
    fn evaluate_empty_batches() {
        let report =
            RankingEvaluator::default().evaluate(&RankingBatch::default(), &RankingBatch::default());
        assert!(report.scores.is_empty());
        assert_eq!(report.summary.mean, None);
    }
}
