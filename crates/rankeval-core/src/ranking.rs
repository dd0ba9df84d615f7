//! Ranking data model: per-query result lists and per-query scores.
//!
//! A [`Ranking`] is an ordered list of document titles, top result first.
//! A [`RankingBatch`] maps each query of a run to the ranking one source
//! returned for it, and a [`ScoreBatch`] maps each evaluated query to its
//! NDCG score.
//!
//! Batches are built once (usually by collecting an iterator) and only read
//! afterwards; there is no mutating API.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Opaque query text. Unique within a batch.
pub type Query = String;

/// Opaque document identifier (a document title). Compared by exact match.
pub type DocumentId = String;

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// An ordered list of document identifiers; index 0 is the top result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ranking(Vec<DocumentId>);

impl Ranking {
    /// Create a ranking from an ordered list of titles.
    #[must_use]
    pub const fn new(documents: Vec<DocumentId>) -> Self {
        Self(documents)
    }

    /// The first `depth` documents (or all of them, if shorter).
    #[must_use]
    pub fn top(&self, depth: usize) -> &[DocumentId] {
        &self.0[..self.0.len().min(depth)]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[DocumentId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentId> {
        self.0.iter()
    }
}

impl<S: Into<DocumentId>> FromIterator<S> for Ranking {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<DocumentId>> for Ranking {
    fn from(documents: Vec<DocumentId>) -> Self {
        Self(documents)
    }
}

// ---------------------------------------------------------------------------
// RankingBatch
// ---------------------------------------------------------------------------

/// Rankings for a batch of queries, keyed by query text.
///
/// Serializes as a JSON object: `{"query": ["Title A", "Title B"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankingBatch(HashMap<Query, Ranking>);

impl RankingBatch {
    /// Look up the ranking fetched for `query`.
    #[must_use]
    pub fn get(&self, query: &str) -> Option<&Ranking> {
        self.0.get(query)
    }

    #[must_use]
    pub fn contains(&self, query: &str) -> bool {
        self.0.contains_key(query)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All queries in the batch, in unspecified order.
    pub fn queries(&self) -> impl Iterator<Item = &Query> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Query, &Ranking)> {
        self.0.iter()
    }
}

impl<Q: Into<Query>> FromIterator<(Q, Ranking)> for RankingBatch {
    fn from_iter<I: IntoIterator<Item = (Q, Ranking)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(q, r)| (q.into(), r)).collect())
    }
}

// ---------------------------------------------------------------------------
// ScoreBatch
// ---------------------------------------------------------------------------

/// Per-query NDCG scores. Iterates in query order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBatch(BTreeMap<Query, f64>);

impl ScoreBatch {
    #[must_use]
    pub fn get(&self, query: &str) -> Option<f64> {
        self.0.get(query).copied()
    }

    #[must_use]
    pub fn contains(&self, query: &str) -> bool {
        self.0.contains_key(query)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Query, f64)> {
        self.0.iter().map(|(q, s)| (q, *s))
    }

    /// Arithmetic mean of all scores, or `None` for an empty batch.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.0.len() as f64;
        Some(self.0.values().sum::<f64>() / count)
    }
}

impl<Q: Into<Query>> FromIterator<(Q, f64)> for ScoreBatch {
    fn from_iter<I: IntoIterator<Item = (Q, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(q, s)| (q.into(), s)).collect())
    }
}
