//! Sumi-Mirror: a domain-fenced web mirror
//!
//! This crate crawls a web graph from a set of seed URLs, restricted to an
//! allow-list of domains. Every distinct page is fetched at most once, its
//! content is persisted under a save root, and the discovery topology is
//! exported as a Graphviz sitemap.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl graph invariant violated: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Start URIs must be absolute: {}", .0.join(", "))]
    InvalidSeeds(Vec<String>),
}

/// Errors raised by the crawl graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("cannot link {from} -> {to}: both pages must be visited first")]
    InvalidEdge { from: String, to: String },
}

/// Result type alias for Sumi-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use state::{CrawlGraph, VisitLabel};
pub use crate::url::{page_key, UriGate};
