//! Configuration module for Sumi-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A validated [`Config`] is immutable; the crawler wraps it in an `Arc` and hands
//! it to every component at construction time.
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Crawler will use {} workers", config.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LogLevel, DEFAULT_MAX_REDIRECTS, DEFAULT_REQUEST_TIMEOUT_SECS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config};
pub use validation::validate;
