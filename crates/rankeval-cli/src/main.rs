#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use rankeval_core::config::{RankevalConfig, load_config};
use rankeval_core::error::ErrorCode;
use rankeval_core::timing;
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "rankeval",
    author,
    version,
    about = "rankeval: offline NDCG of a search engine against a reference ranking",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit command timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Config file (defaults to ./rankeval.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Evaluate",
        about = "Fetch both rankings and score them",
        long_about = "Fetch reference and candidate rankings for every query in a file, then report NDCG per query and on average.",
        after_help = "EXAMPLES:\n    # Score the configured Solr against MediaWiki\n    rankeval eval --queries top-queries.txt\n\n    # Keep the fetched rankings for later offline scoring\n    rankeval eval --queries top-queries.txt --save-rankings runs/baseline\n\n    # Emit machine-readable output\n    rankeval eval --queries top-queries.txt --json"
    )]
    Eval(cmd::eval::EvalArgs),

    #[command(
        next_help_heading = "Evaluate",
        about = "Score two saved ranking batches",
        long_about = "Compute NDCG from two JSON ranking batches without any network access.",
        after_help = "EXAMPLES:\n    # Re-score a saved run\n    rankeval score --reference runs/baseline/reference.json --candidate runs/baseline/candidate.json\n\n    # Score only the top 10\n    rankeval score --reference ref.json --candidate cand.json --depth 10"
    )]
    Score(cmd::score::ScoreArgs),

    #[command(
        next_help_heading = "Sources",
        about = "Fetch one side's rankings",
        long_about = "Fetch rankings from the reference or candidate source and print the batch as JSON.",
        after_help = "EXAMPLES:\n    # Reference rankings to stdout\n    rankeval fetch --source reference --queries top-queries.txt\n\n    # Candidate rankings to a file\n    rankeval fetch --source candidate --queries top-queries.txt --output cand.json"
    )]
    Fetch(cmd::fetch::FetchArgs),

    #[command(
        next_help_heading = "Sources",
        about = "Provision the Solr collection",
        long_about = "Set up the schema, clear, import a content dump, or upload LTR definitions.",
        after_help = "EXAMPLES:\n    # Prepare schema and load a dump\n    rankeval index setup\n    rankeval index import --dump simplewiki-content.json\n\n    # Upload LTR features\n    rankeval index upload-features features.json"
    )]
    Index {
        #[command(subcommand)]
        command: cmd::index::IndexCommand,
    },
}

impl Cli {
    /// Output mode before config is known; used for config errors.
    fn early_output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, None)
    }

    fn output_mode(&self, config: &RankevalConfig) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, config.output.as_deref())
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("RANKEVAL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "rankeval=debug,info"
        } else {
            "rankeval=info,warn"
        })
    });

    let format = env::var("RANKEVAL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays parseable.
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let timing_enabled = cli.timing || timing::timing_enabled_from_env();
    timing::set_timing_enabled(timing_enabled);
    timing::clear_timings();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let working_dir = env::current_dir()?;
    let config = load_config(cli.config.as_deref(), &working_dir)
        .map_err(|e| output::fail(cli.early_output_mode(), ErrorCode::ConfigParseError, e))?;
    let output = cli.output_mode(&config);
    debug!(?output, "resolved output mode");

    let command_result = match &cli.command {
        Commands::Eval(args) => {
            timing::timed("cmd.eval", || cmd::eval::run_eval(args, output, &config))
        }
        Commands::Score(args) => timing::timed("cmd.score", || {
            cmd::score::run_score(args, output, config.evaluation)
        }),
        Commands::Fetch(args) => {
            timing::timed("cmd.fetch", || cmd::fetch::run_fetch(args, output, &config))
        }
        Commands::Index { command } => {
            timing::timed("cmd.index", || cmd::index::run_index(command, output, &config))
        }
    };

    if timing_enabled {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else {
            eprintln!("timing report:");
            eprintln!("{}", report.display_table());
            eprintln!("timing report (json):");
            eprintln!("{}", serde_json::to_string_pretty(&report.to_json())?);
        }
    }

    command_result
}
