//! Command-line entry point for codehound

// Internal modules
mod config;
mod logging;
mod output;
mod search_type;

// Internal imports (std, crate)
use crate::config::CliOverrides;
use crate::output::OutputFormat;
use crate::search_type::SearchType;
use std::io::Write;
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::{Parser, Subcommand};
use codehound_common::CorrelationId;
use codehound_search::{CodeSearch, FileMatch, SearchService};

/// Search GitHub code and confirm every hit against the file's content
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub token (overrides CODEHOUND_GITHUB_TOKEN / GITHUB_TOKEN)
    #[arg(short = 't', long, global = true)]
    token: Option<String>,

    /// Maximum concurrent content requests
    #[arg(short = 'm', long = "max-requests", global = true)]
    max_requests: Option<usize>,

    /// Optional configuration file path (TOML format)
    #[arg(short = 'c', long = "config-file", global = true)]
    config_file: Option<PathBuf>,

    /// Directory for daily-rotated log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search code and print the files that really contain the text
    Search(SearchArgs),
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Text to search for; multiple words are joined with single spaces
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    /// How to interpret the text
    #[arg(short = 's', long = "search-type", value_enum, default_value_t = SearchType::Text)]
    search_type: SearchType,

    /// Only search repositories owned by this organization
    #[arg(short = 'o', long = "organization")]
    organization: Option<String>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl SearchArgs {
    fn text(&self) -> String {
        self.text.join(" ")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    codehound_common::initialize_environment();

    let args = Args::parse();

    let config = config::load(
        args.config_file.as_deref(),
        CliOverrides {
            token: args.token,
            max_requests: args.max_requests,
            log_dir: args.log_dir,
        },
    )?;

    // Keep the guards alive for the whole run so buffered logs are flushed
    let _log_guards = logging::init(&config.telemetry)?;

    match args.command {
        Command::Search(search_args) => {
            config
                .github
                .require_token()
                .context("A GitHub token is required (-t, CODEHOUND_GITHUB_TOKEN or GITHUB_TOKEN)")?;

            let search = CodeSearch::from_config(&config)?;

            let cancel = search.cancellation_token().clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling search");
                    cancel.cancel();
                }
            });

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            run_search(&search, &search_args, config.search.max_concurrency, &mut out).await
        }
    }
}

/// Run one search and render its results to `out`
async fn run_search<S, W>(
    search: &S,
    args: &SearchArgs,
    max_concurrency: usize,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: SearchService + ?Sized,
    W: Write,
{
    let correlation_id = CorrelationId::new();
    let text = args.text();
    let organization = args.organization.as_deref();

    tracing::info!(
        %correlation_id,
        search_type = %args.search_type,
        text = %text,
        organization = organization.unwrap_or_default(),
        max_concurrency,
        "Starting search"
    );

    let results: Vec<FileMatch> = match args.search_type {
        SearchType::Text => {
            search
                .search(&[text], organization, max_concurrency, &[], &correlation_id)
                .await
        }
        SearchType::GoPackage => {
            search
                .symbol_search(&text, organization, max_concurrency, &correlation_id)
                .await
        }
    }
    .context("Search failed")?;

    output::render(&results, args.format, out)
}
