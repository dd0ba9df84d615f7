//! `rankeval index`: provision the Solr collection that serves candidates.

use crate::output::{OutputMode, fail, pretty_kv, render_mode};
use anyhow::{Context as _, Result};
use clap::Subcommand;
use rankeval_core::config::RankevalConfig;
use rankeval_core::error::ErrorCode;
use rankeval_core::timing;
use rankeval_sources::SolrIndexer;
use rankeval_sources::solr::{LtrStore, SetupOutcome};
use rankeval_sources::wiki::read_dump;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum IndexCommand {
    /// Register the multi-valued text dynamic field.
    Setup,
    /// Delete every document in the collection.
    Clear,
    /// Index a CirrusSearch content dump.
    Import {
        /// Newline-delimited bulk dump (action lines are skipped).
        #[arg(long, value_name = "PATH")]
        dump: PathBuf,
    },
    /// Replace the LTR feature store with a JSON definition.
    UploadFeatures {
        #[arg(value_name = "PATH")]
        file: PathBuf,
    },
    /// Replace the LTR model store with a JSON definition.
    UploadModel {
        #[arg(value_name = "PATH")]
        file: PathBuf,
    },
    /// Check that the collection responds.
    Ping,
}

#[derive(Debug, Serialize)]
struct IndexOutcome {
    action: &'static str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<usize>,
}

impl IndexOutcome {
    fn new(action: &'static str, status: impl Into<String>) -> Self {
        Self {
            action,
            status: status.into(),
            documents: None,
        }
    }
}

fn read_definition(path: &Path) -> Result<JsonValue> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn upload(
    indexer: &SolrIndexer,
    store: LtrStore,
    file: &Path,
    output: OutputMode,
) -> Result<IndexOutcome> {
    let definition =
        read_definition(file).map_err(|e| fail(output, ErrorCode::DefinitionFileInvalid, e))?;
    indexer
        .upload(store, &definition)
        .map_err(|e| fail(output, ErrorCode::SolrRequestFailed, e))?;
    let action = match store {
        LtrStore::Features => "upload-features",
        LtrStore::Model => "upload-model",
    };
    Ok(IndexOutcome::new(action, "uploaded"))
}

pub fn run_index(
    command: &IndexCommand,
    output: OutputMode,
    config: &RankevalConfig,
) -> Result<()> {
    let indexer = SolrIndexer::new(
        &config.candidate,
        &config.fetch,
        &config.reference.user_agent,
    );
    let solr_failed = |e: anyhow::Error| fail(output, ErrorCode::SolrRequestFailed, e);

    let outcome = match command {
        IndexCommand::Setup => {
            let status = match indexer.setup().map_err(solr_failed)? {
                SetupOutcome::Created => "created",
                SetupOutcome::AlreadyPresent => "already present",
            };
            IndexOutcome::new("setup", status)
        }
        IndexCommand::Clear => {
            indexer.clear().map_err(solr_failed)?;
            IndexOutcome::new("clear", "cleared")
        }
        IndexCommand::Import { dump } => {
            let documents = read_dump(dump)
                .map_err(|e| fail(output, ErrorCode::DumpFileInvalid, e.into()))?;
            let sent = timing::timed("index.import", || indexer.import(&documents))
                .map_err(solr_failed)?;
            IndexOutcome {
                documents: Some(sent),
                ..IndexOutcome::new("import", "imported")
            }
        }
        IndexCommand::UploadFeatures { file } => {
            upload(&indexer, LtrStore::Features, file, output)?
        }
        IndexCommand::UploadModel { file } => upload(&indexer, LtrStore::Model, file, output)?,
        IndexCommand::Ping => {
            indexer.ping().map_err(solr_failed)?;
            IndexOutcome::new("ping", "ok")
        }
    };

    render_mode(output, &outcome, write_outcome_text, write_outcome_pretty)
}

fn write_outcome_text(outcome: &IndexOutcome, w: &mut dyn Write) -> io::Result<()> {
    match outcome.documents {
        Some(n) => writeln!(w, "{}\t{}\t{n}", outcome.action, outcome.status),
        None => writeln!(w, "{}\t{}", outcome.action, outcome.status),
    }
}

fn write_outcome_pretty(outcome: &IndexOutcome, w: &mut dyn Write) -> io::Result<()> {
    pretty_kv(w, outcome.action, &outcome.status)?;
    if let Some(n) = outcome.documents {
        pretty_kv(w, "documents", n.to_string())?;
    }
    Ok(())
}
