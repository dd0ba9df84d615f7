#![forbid(unsafe_code)]
//! rankeval-sources library.
//!
//! Thin blocking HTTP clients that turn a query into a [`Ranking`], plus the
//! structured fan-out that runs one of them over a whole query list, and the
//! file readers (query lists, wiki dumps) that feed the pipeline.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at the source seam, `anyhow::Result`
//!   for provisioning calls.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! [`Ranking`]: rankeval_core::Ranking

pub mod fanout;
pub mod http;
pub mod queries;
pub mod solr;
pub mod source;
pub mod wiki;

pub use fanout::fetch_rankings;
pub use solr::{SolrIndexer, SolrSource};
pub use source::{RankingSource, SourceError};
pub use wiki::WikiSource;
