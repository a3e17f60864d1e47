use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default bound on redirect hops for a single fetch
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Main configuration structure for Sumi-Mirror
///
/// Every key is optional in the file so that command-line flags can fill in
/// the rest; [`crate::config::validate`] enforces the required ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Hosts the crawler may visit (exact match)
    pub allowed_domains: Vec<String>,

    /// Absolute URIs the crawl starts from
    pub start_uris: Vec<String>,

    /// Root directory for mirrored content and `sitemap.dot`
    pub save_to: Option<PathBuf>,

    /// Minimum severity surfaced by the logger
    pub log_level: LogLevel,

    /// Maximum number of in-flight HTTP requests
    pub max_workers: usize,

    /// Per-request timeout (seconds)
    pub request_timeout: u64,

    /// Maximum number of redirect hops followed for one page
    pub max_redirects: u32,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            start_uris: Vec::new(),
            save_to: None,
            log_level: LogLevel::default(),
            max_workers: default_max_workers(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: format!("sumi-mirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Per-request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Number of logical CPUs, falling back to one
fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Logging severity threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// The directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.request_timeout, 10);
        assert_eq!(config.max_redirects, 10);
        assert!(config.max_workers >= 1);
        assert!(config.save_to.is_none());
        assert!(config.user_agent.starts_with("sumi-mirror/"));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Off.as_filter(), "off");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
    }
}
