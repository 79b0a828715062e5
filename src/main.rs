//! Tidepool command-line entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tidepool::config::{load_config, validate, CrawlConfig};
use tidepool::crawler::crawl;
use tracing_subscriber::EnvFilter;

/// Tidepool: a bounded-concurrency, depth-limited web crawler
///
/// Crawls outward from a start URL with a fixed pool of workers, deduplicates
/// URLs, retries transient failures, and stops at the configured depth,
/// domain boundary, or timeout.
#[derive(Parser, Debug)]
#[command(name = "tidepool")]
#[command(version)]
#[command(about = "A bounded-concurrency, depth-limited web crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Number of concurrent fetch workers
    #[arg(long)]
    workers: Option<usize>,

    /// Maximum link depth from the start URL
    #[arg(long)]
    depth: Option<u32>,

    /// Maximum retries per URL after the first failure
    #[arg(long)]
    retries: Option<u32>,

    /// Overall crawl timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Consult robots.txt before each fetch
    #[arg(long)]
    respect_robots: bool,

    /// Comma-separated list of hosts to stay within (default: start URL host)
    #[arg(long, value_delimiter = ',')]
    domains: Vec<String>,

    /// Delay between fetches per worker, in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Optional TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    tracing::info!(
        workers = config.workers,
        max_depth = config.max_depth,
        max_retries = config.max_retries,
        "Starting crawl of {}",
        cli.start_url
    );

    let result = crawl(config, &cli.start_url)
        .await
        .context("crawl failed")?;

    println!("{}", result);
    for url in &result.visited {
        println!("  {}", url);
    }

    // Per-URL errors are recorded, not fatal: exit 0 either way.
    Ok(())
}

/// Merges the optional config file with CLI flag overrides
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => CrawlConfig::default(),
    };

    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(depth) = cli.depth {
        config.max_depth = depth;
    }
    if let Some(retries) = cli.retries {
        config.max_retries = retries;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    if cli.respect_robots {
        config.respect_robots = true;
    }
    if !cli.domains.is_empty() {
        config.allowed_domains = cli.domains.clone();
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidepool=info,warn"),
            1 => EnvFilter::new("tidepool=debug,info"),
            2 => EnvFilter::new("tidepool=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
