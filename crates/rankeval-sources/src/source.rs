//! The ranking source seam.

use rankeval_core::Ranking;

/// Why a single query could not be turned into a ranking.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Connection, DNS, TLS or timeout failure before a response arrived.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status code.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not the JSON shape the source expects.
    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Anything that can rank documents for a query.
///
/// Implementations must be shareable across the fan-out worker threads.
pub trait RankingSource: Send + Sync {
    /// Short label used in logs and timing names (e.g. `"reference"`).
    fn name(&self) -> &str;

    /// Ranked document titles for `query`, best first.
    ///
    /// An empty ranking is a valid answer ("no hits"); an error means the
    /// source could not answer at all.
    fn fetch_ranking(&self, query: &str) -> Result<Ranking, SourceError>;
}
