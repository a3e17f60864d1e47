//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with manual, bounded redirect handling
//! - Link extraction from HTML
//! - The work queue and fetch slot pool
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, resolve_location, FetchEngine, FetchError, FetchResult};
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor};
pub use scheduler::{CrawlTask, Frontier, PendingGuard, WorkerPool};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::MirrorError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client and shared crawl state
/// 3. Crawl from the start URIs until the frontier drains
/// 4. Normalize the mirrored tree and write the sitemap
pub async fn crawl(config: Config) -> Result<CrawlSummary, MirrorError> {
    run_crawl(config).await
}
