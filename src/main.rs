//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror web mirror.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_mirror::config::{compute_config_hash, parse_config, validate, Config, LogLevel};
use sumi_mirror::crawler::crawl;
use sumi_mirror::output::print_summary;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: a domain-fenced web mirror
///
/// Sumi-Mirror crawls from a set of start URIs, stays inside the allowed
/// domains, saves every page it fetches and writes a Graphviz sitemap of
/// the links it followed.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "A domain-fenced web mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Host the crawler may visit (repeatable)
    #[arg(long = "allowed-domain", value_name = "HOST")]
    allowed_domains: Vec<String>,

    /// Absolute URI to start from (repeatable)
    #[arg(long = "start-uri", value_name = "URI")]
    start_uris: Vec<String>,

    /// Directory to mirror content and the sitemap into
    #[arg(long, value_name = "DIR")]
    save_to: Option<PathBuf>,

    /// Minimum severity to log
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Maximum number of concurrent HTTP requests
    #[arg(long)]
    max_workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    request_timeout: Option<u64>,

    /// Maximum redirect hops per page
    #[arg(long)]
    max_redirects: Option<u32>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Overlays command-line flags on top of a file configuration
    fn apply(self, mut config: Config) -> Config {
        if !self.allowed_domains.is_empty() {
            config.allowed_domains = self.allowed_domains;
        }
        if !self.start_uris.is_empty() {
            config.start_uris = self.start_uris;
        }
        if self.save_to.is_some() {
            config.save_to = self.save_to;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(workers) = self.max_workers {
            config.max_workers = workers;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(redirects) = self.max_redirects {
            config.max_redirects = redirects;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    // Load the file first so flags can override it
    let (file_config, config_hash) = match &cli.config {
        Some(path) => {
            let config = parse_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    let config = cli.apply(file_config);
    setup_logging(config.log_level);

    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded (hash: {})", hash);
    }

    validate(&config).context("Invalid configuration")?;

    if dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    tracing::info!(
        "Allowed domains: {}, start URIs: {}",
        config.allowed_domains.len(),
        config.start_uris.len()
    );

    let summary = crawl(config).await.context("Crawl failed")?;
    print_summary(&summary);

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn setup_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match level {
            LogLevel::Off => "off".to_string(),
            other => format!("sumi_mirror={},warn", other.as_filter()),
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Mirror Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max workers: {}", config.max_workers);
    println!("  Request timeout: {}s", config.request_timeout);
    println!("  Max redirects: {}", config.max_redirects);
    println!("  User agent: {}", config.user_agent);
    println!("  Log level: {}", config.log_level);

    println!("\nOutput:");
    match &config.save_to {
        Some(dir) => println!("  Save to: {}", dir.display()),
        None => println!("  Save to: (crawl only, nothing persisted)"),
    }

    println!("\nAllowed Domains ({}):", config.allowed_domains.len());
    for domain in &config.allowed_domains {
        println!("  - {}", domain);
    }

    println!("\nStart URIs ({}):", config.start_uris.len());
    for uri in &config.start_uris {
        println!("  * {}", uri);
    }

    println!("\n✓ Configuration is valid");
}
