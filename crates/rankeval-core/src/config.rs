use crate::policy::ScoringPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when `--config` is absent.
pub const LOCAL_CONFIG_FILE: &str = "rankeval.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankevalConfig {
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub candidate: CandidateConfig,
    #[serde(default)]
    pub evaluation: ScoringPolicy,
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Preferred output mode (`pretty`, `text`, `json`).
    #[serde(default)]
    pub output: Option<String>,
}

/// Reference ranking source: a MediaWiki search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// `srlimit` sent with each search; MediaWiki returns 10 results otherwise.
    #[serde(default = "default_reference_limit")]
    pub limit: usize,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            api_url: default_reference_api_url(),
            user_agent: default_user_agent(),
            limit: default_reference_limit(),
        }
    }
}

/// Candidate ranking source: a Solr collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateConfig {
    /// Collection URL, e.g. `http://localhost:8983/solr/simplewiki`.
    #[serde(default = "default_candidate_base_url")]
    pub base_url: String,
    /// Request handler path appended to `base_url`.
    #[serde(default = "default_handler")]
    pub handler: String,
    #[serde(default = "default_query_fields")]
    pub query_fields: String,
    /// Stored field holding the document title.
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(default = "default_boost")]
    pub boost: Option<String>,
    #[serde(default = "default_rows")]
    pub rows: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            base_url: default_candidate_base_url(),
            handler: default_handler(),
            query_fields: default_query_fields(),
            title_field: default_title_field(),
            boost: default_boost(),
            rows: default_rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum concurrent requests per source. `0` means one worker per query.
    #[serde(default)]
    pub max_in_flight: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_in_flight: 0,
        }
    }
}

/// Load configuration with precedence: explicit path, `./rankeval.toml`,
/// `<config_dir>/rankeval/config.toml`, then built-in defaults.
///
/// An explicit path that does not exist is an error; the implicit locations
/// are optional.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read, is not valid TOML, or
/// sets `evaluation.depth` to 0.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<RankevalConfig> {
    if let Some(path) = explicit {
        return read_config_file(path);
    }

    let found = std::iter::once(working_dir.join(LOCAL_CONFIG_FILE))
        .chain(user_config_path())
        .find(|path| path.exists());

    match found {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            read_config_file(&path)
        }
        None => Ok(RankevalConfig::default()),
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rankeval/config.toml"))
}

fn read_config_file(path: &Path) -> Result<RankevalConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<RankevalConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if config.evaluation.depth == 0 {
        anyhow::bail!(
            "Invalid {}: evaluation.depth must be at least 1",
            path.display()
        );
    }

    Ok(config)
}

fn default_reference_api_url() -> String {
    "https://simple.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    concat!("rankeval/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_reference_limit() -> usize {
    crate::policy::DEFAULT_DEPTH
}

fn default_candidate_base_url() -> String {
    "http://localhost:8983/solr/simplewiki".to_string()
}

fn default_handler() -> String {
    "browse".to_string()
}

fn default_query_fields() -> String {
    [
        "title_txt_en_split",
        "opening_txt_en_split",
        "text_txt_en_split",
        "category_txts_en",
        "auxiliary_text_txts_en",
        "redirect_txts_en",
        "heading_txts_en",
    ]
    .join(" ")
}

fn default_title_field() -> String {
    "title_txt_en_split".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_boost() -> Option<String> {
    Some("popularity_score_f".to_string())
}

const fn default_rows() -> usize {
    100
}

const fn default_timeout_secs() -> u64 {
    30
}
