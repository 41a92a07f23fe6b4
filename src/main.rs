//! LinkSpector main entry point
//!
//! This is the command-line interface for the LinkSpector link checker.

use anyhow::Context;
use clap::Parser;
use linkspector::config::{load_config_with_hash, validate_crawl_options, Config, NonRecursiveScope};
use linkspector::crawler::{Coordinator, Progress};
use linkspector::output::{print_report, summarize, write_json_report, JsonReport};
use linkspector::quirks::Quirks;
use linkspector::normalize_address;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Exit code for invalid arguments or configuration
const EXIT_ARGUMENT_ERROR: u8 = 1;

/// Exit code for a crawl that found broken links with `--fail-on-broken`
const EXIT_BROKEN_LINKS: u8 = 2;

/// LinkSpector: a broken link checker
///
/// LinkSpector fetches the root address, checks every link found on it and,
/// when recursive, keeps following links that stay on the root host.
#[derive(Parser, Debug)]
#[command(name = "linkspector")]
#[command(version)]
#[command(about = "A broken link checker", long_about = None)]
struct Cli {
    /// Address the crawl starts from
    #[arg(value_name = "ROOT_URL")]
    root: String,

    /// Recursively crawl every page on the root host
    #[arg(short, long)]
    recursive: bool,

    /// Allow insecure or missing TLS certificates
    #[arg(short = 'i', long = "allow-insecure")]
    allow_insecure: bool,

    /// Timeout in seconds for each request
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Append log output to a file instead of stderr
    #[arg(short, long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Without --recursive, check only the root address
    #[arg(long, conflicts_with = "recursive")]
    root_only: bool,

    /// Maximum number of requests in flight
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// Also write the results as JSON to this file
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Exit with code 2 if any link is broken
    #[arg(long)]
    fail_on_broken: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not errors
            return if e.use_stderr() {
                ExitCode::from(EXIT_ARGUMENT_ERROR)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to set up logging: {:#}", e);
        return ExitCode::from(EXIT_ARGUMENT_ERROR);
    }

    // Everything that can fail in `prepare` is a usage problem
    let (coordinator, json_path) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(EXIT_ARGUMENT_ERROR);
        }
    };

    match handle_crawl(coordinator, &cli.root, json_path.as_deref(), cli.fail_on_broken).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkspector=info,warn"),
            1 => EnvFilter::new("linkspector=debug,info"),
            2 => EnvFilter::new("linkspector=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Loads configuration, applies command-line overrides and builds the coordinator
fn prepare(cli: &Cli) -> anyhow::Result<(Coordinator, Option<PathBuf>)> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, cli);
    validate_crawl_options(&config.crawl).context("Invalid command-line options")?;

    let root = normalize_address(&cli.root)
        .with_context(|| format!("Invalid root address '{}'", cli.root))?;
    let quirks = Quirks::with_exclusions(config.exclusion_patterns()?);

    tracing::debug!("Crawl options: {:?}", config.crawl);
    let coordinator = Coordinator::new(root, config.crawl)
        .context("Failed to build HTTP client")?
        .with_quirks(quirks);

    Ok((coordinator, cli.json.clone()))
}

/// Command-line flags win over configuration file values
fn apply_overrides(config: &mut Config, cli: &Cli) {
    let crawl = &mut config.crawl;
    if cli.recursive {
        crawl.recursive = true;
    }
    if cli.allow_insecure {
        crawl.allow_insecure_tls = true;
    }
    if let Some(timeout) = cli.timeout {
        crawl.timeout_seconds = timeout;
    }
    if cli.root_only {
        crawl.non_recursive_scope = NonRecursiveScope::RootOnly;
    }
    if let Some(max_concurrent) = cli.max_concurrent {
        crawl.max_concurrent_fetches = max_concurrent;
    }
}

/// Handles the main crawl operation
async fn handle_crawl(
    coordinator: Coordinator,
    root: &str,
    json_path: Option<&Path>,
    fail_on_broken: bool,
) -> anyhow::Result<ExitCode> {
    let gateway = coordinator.gateway();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the results gathered so far");
            gateway.stop();
        }
    });

    let reporter = tokio::spawn(report_progress(coordinator.progress()));

    let start_time = Instant::now();
    let results = coordinator.run().await;
    let elapsed = start_time.elapsed();

    reporter.abort();
    interrupt.abort();
    tracing::debug!("LinkSpector completed in {}ms", elapsed.as_millis());

    print_report(&results, elapsed).context("Failed to print report")?;

    if let Some(path) = json_path {
        let report = JsonReport::new(root, &results, elapsed.as_millis() as u64);
        write_json_report(&report, path)?;
    }

    if fail_on_broken && summarize(&results).has_broken_links() {
        return Ok(ExitCode::from(EXIT_BROKEN_LINKS));
    }
    Ok(ExitCode::SUCCESS)
}

/// Logs a progress line every 500ms, but only when a counter changed
async fn report_progress(progress: Arc<Progress>) {
    let mut interval = tokio::time::interval(Duration::from_millis(500));
    let mut last = (0, 0);

    loop {
        interval.tick().await;
        let current = progress.snapshot();
        if current != last {
            last = current;
            tracing::info!("{} out of {} pages visited", current.0, current.1);
        }
    }
}
