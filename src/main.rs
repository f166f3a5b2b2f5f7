//! Site-Harvest main entry point
//!
//! This is the command-line interface for the Site-Harvest crawler.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use site_harvest::config::{
    load_config, validate, CrawlConfig, DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS,
};
use site_harvest::crawler::Crawler;
use site_harvest::report::{Report, CRAWL_STEP};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Site-Harvest: a breadth-first website harvester
///
/// Site-Harvest walks a site from a seed URL, staying under the seed's host
/// and path, and saves every page as an HTML file.
#[derive(Parser, Debug)]
#[command(name = "site-harvest")]
#[command(version)]
#[command(about = "A breadth-first website harvester", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// BFS-crawl a website and save HTML pages
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL; only pages under its host and path are followed
    #[arg(value_name = "URL", required_unless_present = "config")]
    url: Option<String>,

    /// Load crawl settings from a TOML file instead of flags
    #[arg(long, value_name = "FILE", conflicts_with_all = [
        "url", "output", "max_pages", "delay_ms", "max_concurrency", "cache_dir"
    ])]
    config: Option<PathBuf>,

    /// Directory for saved HTML files
    #[arg(short, long, default_value = "html_output")]
    output: PathBuf,

    /// Maximum number of pages to crawl (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_pages: usize,

    /// Delay between requests in milliseconds (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    delay_ms: u64,

    /// Number of parallel HTTP workers
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    max_concurrency: usize,

    /// Disk cache directory for HTTP responses
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Retry the failed URLs of a previous report instead of crawling
    #[arg(long, value_name = "REPORT")]
    retry_from_report: Option<PathBuf>,

    /// Write a JSON report of this run
    #[arg(long, value_name = "REPORT")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let logger = setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => handle_crawl(args, logger).await,
    }
}

/// Builds the tracing subscriber for the chosen verbosity
///
/// The returned handle is given to the crawler explicitly and also installed
/// as the default for this binary's own messages.
fn setup_logging(verbose: u8, quiet: bool) -> Dispatch {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_harvest=info,warn"),
            1 => EnvFilter::new("site_harvest=debug,info"),
            2 => EnvFilter::new("site_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .finish();

    let dispatch = Dispatch::new(subscriber);
    if tracing::dispatcher::set_global_default(dispatch.clone()).is_err() {
        eprintln!("warning: a global tracing subscriber was already installed");
    }
    dispatch
}

/// Builds the crawl configuration from a config file or from flags
///
/// Flag-built configurations go through the same validation as config files.
fn build_config(args: &CrawlArgs) -> anyhow::Result<CrawlConfig> {
    if let Some(path) = &args.config {
        tracing::info!("Loading configuration from: {}", path.display());
        return load_config(path)
            .with_context(|| format!("failed to load configuration {}", path.display()));
    }

    let Some(url) = &args.url else {
        bail!("a start URL or --config is required");
    };

    let mut config = CrawlConfig::new(url.clone(), args.output.clone());
    config.max_pages = args.max_pages;
    config.delay_ms = args.delay_ms;
    config.max_concurrency = args.max_concurrency;
    config.cache_dir = args.cache_dir.clone();

    validate(&config).context("invalid crawl options")?;
    Ok(config)
}

/// Handles the crawl command
async fn handle_crawl(args: CrawlArgs, logger: Dispatch) -> anyhow::Result<()> {
    let mut config = build_config(&args)?;

    if let Some(path) = &args.retry_from_report {
        let previous = Report::load(path).context("load retry report")?;
        config.retry_urls = previous.failed_urls(CRAWL_STEP);
        tracing::info!("Retrying {} failed URLs", config.retry_urls.len());

        if config.retry_urls.is_empty() {
            println!("Nothing to retry: no failed crawl URLs in {}", path.display());
            return Ok(());
        }
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling remaining requests");
            ctrl_c.cancel();
        }
    });

    let mut report = args.report.as_ref().map(|_| {
        let mut report = Report::new();
        report.add_step(CRAWL_STEP);
        report
    });
    let started = std::time::Instant::now();

    let crawler = Crawler::new(config, logger).context("failed to initialize crawler")?;
    let outcome = crawler.run(cancel).await.context("crawl failed")?;

    if let (Some(report), Some(path)) = (report.as_mut(), args.report.as_ref()) {
        if let Some(step) = report.steps.last_mut() {
            step.record_crawl(&outcome);
            step.finish();
        }
        if let Err(e) = report.write(path) {
            tracing::warn!("Failed to write report: {}", e);
        }
    }

    tracing::info!("Crawl finished in {:?}", started.elapsed());
    println!("Crawl complete: {}", outcome.summary());

    Ok(())
}
