//! Opt-in latency collection for CLI stages and per-query fetches.
//!
//! Samples go into a process-wide buffer so fetch workers running on scoped
//! threads report into the same [`TimingReport`] as the main thread.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde_json::json;

/// Aggregated timing report across instrumented operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingReport {
    pub operations: Vec<OpTiming>,
}

/// Timing statistics for a single named operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTiming {
    pub name: String,
    pub count: usize,
    pub total: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub max: Duration,
}

static SAMPLES: Mutex<Vec<(String, Duration)>> = Mutex::new(Vec::new());
static TIMING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Returns true when `RANKEVAL_TIMING` is set to `1`, `true`, `yes` or `on`.
#[must_use]
pub fn timing_enabled_from_env() -> bool {
    std::env::var("RANKEVAL_TIMING")
        .ok()
        .is_some_and(|value| is_truthy(&value))
}

pub fn set_timing_enabled(enabled: bool) {
    TIMING_ENABLED.store(enabled, Ordering::Relaxed);
    if !enabled {
        clear_timings();
    }
}

#[must_use]
pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::Relaxed)
}

pub fn clear_timings() {
    with_samples(Vec::clear);
}

/// Run `f`, recording its wall time under `name` when timing is enabled.
pub fn timed<R>(name: &str, f: impl FnOnce() -> R) -> R {
    if !is_timing_enabled() {
        return f();
    }

    let started = Instant::now();
    let result = f();
    let elapsed = started.elapsed();
    with_samples(|samples| samples.push((name.to_string(), elapsed)));
    result
}

/// Drain all recorded samples into a report grouped by operation name.
#[must_use]
pub fn collect_report() -> TimingReport {
    let mut drained = Vec::new();
    with_samples(|samples| drained = std::mem::take(samples));

    let mut grouped: BTreeMap<String, Vec<Duration>> = BTreeMap::new();
    for (name, elapsed) in drained {
        grouped.entry(name).or_default().push(elapsed);
    }

    let operations = grouped
        .into_iter()
        .map(|(name, mut values)| {
            values.sort_unstable();
            OpTiming {
                name,
                count: values.len(),
                total: values.iter().sum(),
                p50: percentile(&values, 50),
                p95: percentile(&values, 95),
                max: values.last().copied().unwrap_or_default(),
            }
        })
        .collect();

    TimingReport { operations }
}

impl TimingReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let operations = self
            .operations
            .iter()
            .map(|op| {
                json!({
                    "name": op.name,
                    "count": op.count,
                    "total_us": op.total.as_micros(),
                    "p50_us": op.p50.as_micros(),
                    "p95_us": op.p95.as_micros(),
                    "max_us": op.max.as_micros(),
                })
            })
            .collect::<Vec<_>>();

        json!({ "operations": operations })
    }

    #[must_use]
    pub fn display_table(&self) -> String {
        use std::fmt::Write as _;

        if self.operations.is_empty() {
            return "No timing samples recorded.".to_string();
        }

        let mut out = String::new();
        out.push_str("operation              count     total       p50       p95       max\n");
        out.push_str("--------------------------------------------------------------------\n");

        for op in &self.operations {
            let _ = writeln!(
                out,
                "{:<22} {:>5} {:>9} {:>9} {:>9} {:>9}",
                op.name,
                op.count,
                format_duration(op.total),
                format_duration(op.p50),
                format_duration(op.p95),
                format_duration(op.max)
            );
        }

        out
    }
}

fn with_samples(f: impl FnOnce(&mut Vec<(String, Duration)>)) {
    // A poisoned buffer only means a worker panicked mid-push; keep going.
    let mut guard = SAMPLES
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&mut guard);
}

fn percentile(sorted: &[Duration], pct: usize) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }

    let rank = pct.min(100).saturating_mul(sorted.len()).saturating_add(99) / 100;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros >= 1_000_000 {
        format!("{}.{:03}s", micros / 1_000_000, (micros % 1_000_000) / 1_000)
    } else if micros >= 1_000 {
        format!("{}.{:03}ms", micros / 1_000, micros % 1_000)
    } else {
        format!("{micros}µs")
    }
}

fn is_truthy(value: &str) -> bool {
    ["1", "true", "yes", "on"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy))
}
