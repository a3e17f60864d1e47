//! Output module for crawl artifacts and reports
//!
//! This module handles:
//! - Rendering the crawl graph as a Graphviz sitemap
//! - Recording crawl statistics and printing a run summary

mod dot;
pub mod stats;

pub use dot::{render_sitemap, write_sitemap, SITEMAP_FILE};
pub use stats::{print_summary, CrawlStats, CrawlSummary};
