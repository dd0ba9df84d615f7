//! Solr as the system under test: ranking fetch plus the provisioning calls
//! that prepare a collection (schema, bulk import, LTR feature and model
//! stores).

use crate::http::{build_agent, call_json, join_url, map_error};
use crate::source::{RankingSource, SourceError};
use crate::wiki::WikiDocument;
use anyhow::{Context, Result};
use rankeval_core::Ranking;
use rankeval_core::config::{CandidateConfig, FetchConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::{debug, info};

/// Documents per `/update/json/docs` request during import.
pub const IMPORT_BATCH_SIZE: usize = 1_000;

/// Dynamic field pattern the imported multi-valued text fields rely on.
pub const SPLIT_TEXT_DYNAMIC_FIELD: &str = "*_txts_en_split";

// ---------------------------------------------------------------------------
// Candidate source
// ---------------------------------------------------------------------------

/// Candidate rankings from a Solr request handler.
pub struct SolrSource {
    agent: ureq::Agent,
    url: String,
    config: CandidateConfig,
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectDocs,
}

#[derive(Debug, Deserialize)]
struct SelectDocs {
    #[serde(default)]
    docs: Vec<serde_json::Map<String, JsonValue>>,
}

impl SolrSource {
    #[must_use]
    pub fn new(candidate: &CandidateConfig, fetch: &FetchConfig, user_agent: &str) -> Self {
        Self {
            agent: build_agent(fetch, user_agent),
            url: join_url(&candidate.base_url, &candidate.handler),
            config: candidate.clone(),
        }
    }
}

impl RankingSource for SolrSource {
    fn name(&self) -> &str {
        "candidate"
    }

    fn fetch_ranking(&self, query: &str) -> Result<Ranking, SourceError> {
        let mut request = self
            .agent
            .get(&self.url)
            .query("q", query)
            .query("qf", &self.config.query_fields)
            .query("wt", "json")
            .query("fl", &self.config.title_field)
            .query("rows", &self.config.rows.to_string());

        if let Some(boost) = self.config.boost.as_deref().filter(|b| !b.is_empty()) {
            request = request.query("boost", boost);
        }

        let response: SelectResponse = call_json(&self.url, request)?;
        Ok(titles_from_docs(response.response.docs, &self.config.title_field))
    }
}

/// Pull the title out of each returned doc. Text fields may come back
/// multi-valued; the first value is used. Docs without the field are dropped.
fn titles_from_docs(docs: Vec<serde_json::Map<String, JsonValue>>, field: &str) -> Ranking {
    docs.into_iter()
        .filter_map(|mut doc| {
            let title = match doc.remove(field) {
                Some(JsonValue::String(title)) => Some(title),
                Some(JsonValue::Array(values)) => values
                    .into_iter()
                    .find_map(|v| v.as_str().map(str::to_string)),
                _ => None,
            };
            if title.is_none() {
                debug!(field, "solr doc without title field");
            }
            title
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Document mapping
// ---------------------------------------------------------------------------

/// A wiki page in the Solr field layout the candidate schema expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolrDocument {
    pub id: String,
    pub title_txt_en_split: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_txt_en_split: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_txt_en_split: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity_score_f: Option<f64>,
    pub category_txts_en_split: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_links_i: Option<u64>,
    pub auxiliary_text_txts_en_split: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_dt: Option<String>,
    pub redirect_txts_en_split: Vec<String>,
    pub heading_txts_en_split: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_dt: Option<String>,
}

impl From<&WikiDocument> for SolrDocument {
    fn from(doc: &WikiDocument) -> Self {
        Self {
            id: doc.title.clone(),
            title_txt_en_split: doc.title.clone(),
            opening_txt_en_split: doc.opening_text.clone(),
            text_txt_en_split: doc.text.clone(),
            popularity_score_f: doc.popularity_score,
            category_txts_en_split: doc.category.clone(),
            incoming_links_i: doc.incoming_links,
            auxiliary_text_txts_en_split: doc.auxiliary_text.clone(),
            update_dt: doc.timestamp.clone(),
            redirect_txts_en_split: doc.redirect.iter().map(|r| r.title.clone()).collect(),
            heading_txts_en_split: doc.heading.clone(),
            create_dt: doc.create_timestamp.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

/// Result of [`SolrIndexer::setup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Created,
    AlreadyPresent,
}

/// Which LTR store an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LtrStore {
    Features,
    Model,
}

impl LtrStore {
    const fn path(self) -> &'static str {
        match self {
            Self::Features => "schema/feature-store",
            Self::Model => "schema/model-store",
        }
    }
}

/// Schema and content management for the candidate collection.
pub struct SolrIndexer {
    agent: ureq::Agent,
    base_url: String,
}

impl SolrIndexer {
    #[must_use]
    pub fn new(candidate: &CandidateConfig, fetch: &FetchConfig, user_agent: &str) -> Self {
        Self {
            agent: build_agent(fetch, user_agent),
            base_url: candidate.base_url.clone(),
        }
    }

    /// Register the `*_txts_en_split` dynamic field unless Solr already
    /// knows it.
    ///
    /// # Errors
    ///
    /// Returns an error if the field lookup fails with anything but 404, or if the
    /// schema update is rejected.
    pub fn setup(&self) -> Result<SetupOutcome> {
        let lookup_url = join_url(
            &self.base_url,
            &format!("schema/dynamicfields/{SPLIT_TEXT_DYNAMIC_FIELD}"),
        );

        match self.agent.get(&lookup_url).call() {
            Ok(_) => {
                info!(field = SPLIT_TEXT_DYNAMIC_FIELD, "dynamic field already present");
                return Ok(SetupOutcome::AlreadyPresent);
            }
            Err(ureq::Error::Status(404, _)) => {}
            Err(err) => {
                return Err(map_error(&lookup_url, err))
                    .context("failed to look up dynamic field in Solr schema");
            }
        }

        let schema_url = join_url(&self.base_url, "schema");
        self.agent
            .post(&schema_url)
            .send_json(dynamic_field_definition())
            .map_err(|err| map_error(&schema_url, err))
            .context("failed to add dynamic field")?;

        info!(field = SPLIT_TEXT_DYNAMIC_FIELD, "added dynamic field");
        Ok(SetupOutcome::Created)
    }

    /// Delete every document in the collection and commit.
    ///
    /// # Errors
    ///
    /// Returns an error if Solr rejects the delete.
    pub fn clear(&self) -> Result<()> {
        let url = join_url(&self.base_url, "update?commit=true");
        self.agent
            .post(&url)
            .set("Content-Type", "text/xml; charset=utf-8")
            .send_string("<delete><query>*:*</query></delete>")
            .map_err(|err| map_error(&url, err))
            .context("failed to delete documents")?;

        info!("cleared collection");
        Ok(())
    }

    /// Index `documents` in batches of [`IMPORT_BATCH_SIZE`], overwriting
    /// existing ids. Returns the number of documents sent.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected batch; earlier batches stay committed.
    pub fn import(&self, documents: &[WikiDocument]) -> Result<usize> {
        let url = join_url(&self.base_url, "update/json/docs?commit=true&overwrite=true");
        let mut sent = 0;

        for (batch_no, batch) in documents.chunks(IMPORT_BATCH_SIZE).enumerate() {
            let payload: Vec<SolrDocument> = batch.iter().map(SolrDocument::from).collect();
            self.agent
                .post(&url)
                .set("Content-Type", "application/json; charset=utf-8")
                .send_json(&payload)
                .map_err(|err| map_error(&url, err))
                .with_context(|| format!("failed to import batch {batch_no}"))?;

            sent += payload.len();
            debug!(batch = batch_no, sent, "imported batch");
        }

        info!(documents = sent, "import complete");
        Ok(sent)
    }

    /// Replace the contents of an LTR store with `definition`.
    ///
    /// # Errors
    ///
    /// Returns an error if the PUT fails.
    pub fn upload(&self, store: LtrStore, definition: &JsonValue) -> Result<()> {
        let url = join_url(&self.base_url, store.path());
        self.agent
            .put(&url)
            .send_json(definition)
            .map_err(|err| map_error(&url, err))
            .with_context(|| format!("failed to upload to {}", store.path()))?;

        info!(store = store.path(), "uploaded definition");
        Ok(())
    }

    /// Check that the collection answers at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the ping handler is unreachable or not JSON.
    pub fn ping(&self) -> Result<()> {
        let url = join_url(&self.base_url, "admin/ping?wt=json");
        let _: JsonValue = call_json(&url, self.agent.get(&url)).context("Solr ping failed")?;
        Ok(())
    }
}

fn dynamic_field_definition() -> JsonValue {
    json!({
        "add-dynamic-field": {
            "name": SPLIT_TEXT_DYNAMIC_FIELD,
            "type": "text_en_splitting",
            "multiValued": true,
            "stored": true,
            "indexed": true
        }
    })
}
