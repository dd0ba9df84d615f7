#![forbid(unsafe_code)]
//! rankeval-core library.
//!
//! Ranking data model, the NDCG [`evaluator`], its configurable scoring
//! [`policy`], and the shared configuration and error vocabulary used by the
//! fetch collaborators and the CLI.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types where appropriate.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod ranking;
pub mod timing;

pub use evaluator::{BatchSummary, EvaluationReport, RankingEvaluator};
pub use policy::{Discount, Gain, ScoringPolicy};
pub use ranking::{Ranking, RankingBatch, ScoreBatch};
