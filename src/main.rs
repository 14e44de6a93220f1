//! Command line front end: one lookup or one batch per invocation.
//!
//! ```text
//! rowmatch lookup '{"side":"IN","currency":"PLN"}' data.csv
//! rowmatch batch '[{"id":2,"name":"Bob"},{"id":4,"name":"Bob"}]' data.csv
//! ```
//!
//! The source argument is a path when it names an existing file and CSV text
//! otherwise.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use rowmatch::cache::MatchCache;
use rowmatch::config::EngineConfig;
use rowmatch::matcher::Matcher;
use rowmatch::query::{Query, queries_from_json};
use rowmatch::source::DataSource;
use rowmatch::{MatchError, Result};

#[derive(Parser, Debug)]
#[command(about = "Exact-match lookups and weighted batch averages over CSV data")]
struct Args {
    /// Configuration file (defaults to an optional rowmatch.{toml,json,yaml}).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value of the first row matching a JSON object query.
    Lookup {
        query: String,
        source: String,
    },
    /// Print the parity-weighted average over a JSON array of queries.
    Batch {
        queries: String,
        source: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cache = MatchCache::from_config(&config);
    match run(&Matcher::new(&cache), args.command) {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "lookup failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(matcher: &Matcher, command: Command) -> Result<String> {
    match command {
        Command::Lookup { query, source } => {
            let query = Query::from_json(&parse_json(&query)?)?;
            matcher.lookup(&query, DataSource::infer(&source))
        }
        Command::Batch { queries, source } => {
            let queries = queries_from_json(&parse_json(&queries)?)?;
            matcher.batch_lookup(&queries, DataSource::infer(&source))
        }
    }
}

fn parse_json(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).map_err(|e| MatchError::InvalidArgument(format!("invalid JSON: {e}")))
}
