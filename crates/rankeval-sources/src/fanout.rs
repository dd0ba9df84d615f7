//! Concurrent fetch of one ranking per query.
//!
//! Workers run on scoped threads, so every request has finished (or failed)
//! before [`fetch_rankings`] returns and scoring starts. With
//! `max_in_flight == 0` each query gets its own worker; otherwise that many
//! workers pull queries from a shared cursor until the list is drained.
//!
//! A query whose fetch fails is logged and left out of the batch. An empty
//! result list is kept as an empty ranking.

use crate::source::RankingSource;
use rankeval_core::ranking::{Query, Ranking, RankingBatch};
use rankeval_core::timing;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Fetch a ranking for every query from `source`.
#[must_use]
pub fn fetch_rankings<S>(source: &S, queries: &[Query], max_in_flight: usize) -> RankingBatch
where
    S: RankingSource + ?Sized,
{
    let workers = if max_in_flight == 0 {
        queries.len()
    } else {
        max_in_flight.min(queries.len())
    };
    let timing_name = format!("fetch.{}", source.name());
    let timing_name = timing_name.as_str();
    let cursor = AtomicUsize::new(0);
    let cursor = &cursor;

    let fetched: Vec<(Query, Ranking)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(query) = queries.get(index) else {
                            break;
                        };
                        if let Some(ranking) = fetch_one(source, query, timing_name) {
                            done.push((query.clone(), ranking));
                        }
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(done) => Some(done),
                Err(_) => {
                    warn!(source = source.name(), "fetch worker panicked; its queries are dropped");
                    None
                }
            })
            .flatten()
            .collect()
    });

    info!(
        source = source.name(),
        requested = queries.len(),
        fetched = fetched.len(),
        "fetched rankings"
    );

    fetched.into_iter().collect()
}

fn fetch_one<S>(source: &S, query: &str, timing_name: &str) -> Option<Ranking>
where
    S: RankingSource + ?Sized,
{
    match timing::timed(timing_name, || source.fetch_ranking(query)) {
        Ok(ranking) => {
            debug!(source = source.name(), query, results = ranking.len(), "fetched");
            Some(ranking)
        }
        Err(err) => {
            warn!(source = source.name(), query, error = %err, "could not fetch ranking");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Echoes the query back as a one-document ranking; fails for queries
    /// starting with `fail`.
    struct EchoSource {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: Mutex<Vec<String>>,
    }

    impl EchoSource {
        fn new() -> Self {
            Self {
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RankingSource for EchoSource {
        fn name(&self) -> &str {
            "echo"
        }

        fn fetch_ranking(&self, query: &str) -> Result<Ranking, SourceError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.calls.lock().expect("calls lock").push(query.to_string());

            if query.starts_with("fail") {
                return Err(SourceError::Status {
                    url: "http://echo.test".to_string(),
                    status: 503,
                });
            }
            if query == "nothing" {
                return Ok(Ranking::default());
            }
            Ok([format!("{query} (doc)")].into_iter().collect())
        }
    }

    fn queries(items: &[&str]) -> Vec<Query> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn every_query_is_fetched_once() {
        let source = EchoSource::new();
        let qs = queries(&["alpha", "beta", "gamma", "delta"]);

        let batch = fetch_rankings(&source, &qs, 0);

        assert_eq!(batch.len(), 4);
        let mut calls = source.calls.lock().expect("calls lock").clone();
        calls.sort();
        assert_eq!(calls, ["alpha", "beta", "delta", "gamma"]);
        assert_eq!(
            batch.get("beta").map(|r| r.as_slice().to_vec()),
            Some(vec!["beta (doc)".to_string()])
        );
    }

    #[test]
    fn failed_queries_are_omitted_but_empty_results_kept() {
        let source = EchoSource::new();
        let qs = queries(&["ok", "fail-1", "nothing", "fail-2"]);

        let batch = fetch_rankings(&source, &qs, 0);

        assert_eq!(batch.len(), 2);
        assert!(batch.contains("ok"));
        assert!(batch.get("nothing").is_some_and(Ranking::is_empty));
        assert!(!batch.contains("fail-1"));
        assert!(!batch.contains("fail-2"));
    }

    #[test]
    fn max_in_flight_bounds_concurrency() {
        let source = EchoSource::new();
        let qs: Vec<Query> = (0..12).map(|i| format!("q{i}")).collect();

        let batch = fetch_rankings(&source, &qs, 3);

        assert_eq!(batch.len(), 12);
        assert!(source.peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn empty_query_list_spawns_nothing() {
        let source = EchoSource::new();
        let batch = fetch_rankings(&source, &[], 4);
        assert!(batch.is_empty());
        assert!(source.calls.lock().expect("calls lock").is_empty());
    }
}
