//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with automatic redirects disabled
//! - Following redirects manually, bounded by a hop limit
//! - Re-checking every redirect target against the crawl gate
//! - Error classification

use crate::config::Config;
use crate::url::{GateRejection, UriGate};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Final URL after redirects
    pub final_url: Url,

    /// Raw response body
    pub body: Vec<u8>,

    /// Media type from the Content-Type header, without parameters
    pub content_type: String,
}

impl FetchResult {
    /// Returns true if the declared media type is exactly `text/html`
    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }
}

/// Reasons a fetch can fail
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    RequestTimeout { url: Url },

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { url: Url, status: u16 },

    #[error("Redirect from {url} to {target} rejected: {reason}")]
    RedirectRejected {
        url: Url,
        target: Url,
        reason: GateRejection,
    },

    #[error("Too many redirects from {url}")]
    TooManyRedirects { url: Url },

    #[error("Redirect from {url} has no Location header")]
    MissingLocation { url: Url },

    #[error("Redirect from {url} has unusable Location '{location}'")]
    InvalidLocation { url: Url, location: String },

    #[error("HTTP error for {url}: {source}")]
    Network { url: Url, source: reqwest::Error },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed by the client itself; [`FetchEngine`]
/// handles them so that every hop passes through the gate.
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::Config;
/// use sumi_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages, chasing redirects within the allow-list
#[derive(Debug, Clone)]
pub struct FetchEngine {
    client: Client,
    gate: Arc<UriGate>,
    max_redirects: u32,
}

impl FetchEngine {
    /// Creates an engine from a prepared client
    pub fn new(client: Client, gate: Arc<UriGate>, max_redirects: u32) -> Self {
        Self {
            client,
            gate,
            max_redirects,
        }
    }

    /// Creates an engine and its client from the configuration
    pub fn from_config(config: &Config, gate: Arc<UriGate>) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::new(client, gate, config.max_redirects))
    }

    /// Fetches a URL, following redirects
    ///
    /// # Redirect Flow
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return body, content type and the URL that produced it |
    /// | HTTP 301/302/303/307/308 | Resolve `Location` against the request origin |
    /// | Hop limit reached | `TooManyRedirects` |
    /// | Target refused by the gate | `RedirectRejected` |
    /// | Any other status | `UnexpectedStatus` |
    /// | Timeout | `RequestTimeout`, no retry |
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let mut current = url.clone();
        let mut hops = 0;

        loop {
            match self.fetch_once(&current).await? {
                Hop::Done(result) => return Ok(result),
                Hop::Redirect(target) => {
                    if hops >= self.max_redirects {
                        tracing::warn!("Giving up on {} after {} redirects", url, hops);
                        return Err(FetchError::TooManyRedirects { url: url.clone() });
                    }

                    if let Err(reason) = self.gate.check(&target) {
                        tracing::info!("Redirect {} -> {} rejected: {}", current, target, reason);
                        return Err(FetchError::RedirectRejected {
                            url: current,
                            target,
                            reason,
                        });
                    }

                    tracing::debug!("Following redirect {} -> {}", current, target);
                    current = target;
                    hops += 1;
                }
            }
        }
    }

    /// Issues a single GET and classifies the response
    async fn fetch_once(&self, url: &Url) -> Result<Hop, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();

        if status == StatusCode::OK {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(media_type)
                .unwrap_or_default();

            let body = response
                .bytes()
                .await
                .map_err(|e| classify_error(url, e))?;

            tracing::info!("Fetched {} ({}, {} bytes)", url, content_type, body.len());

            return Ok(Hop::Done(FetchResult {
                final_url: url.clone(),
                body: body.to_vec(),
                content_type,
            }));
        }

        if is_redirect(status) {
            let location = response
                .headers()
                .get(LOCATION)
                .ok_or_else(|| FetchError::MissingLocation { url: url.clone() })?;

            let location = location.to_str().map_err(|_| FetchError::InvalidLocation {
                url: url.clone(),
                location: String::from_utf8_lossy(location.as_bytes()).into_owned(),
            })?;

            return resolve_location(url, location).map(Hop::Redirect);
        }

        tracing::warn!("Unexpected status {} for {}", status.as_u16(), url);
        Err(FetchError::UnexpectedStatus {
            url: url.clone(),
            status: status.as_u16(),
        })
    }
}

/// Outcome of a single request
enum Hop {
    Done(FetchResult),
    Redirect(Url),
}

/// Returns true for the redirect statuses handled uniformly
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Resolves a `Location` value against the origin of the redirecting request
///
/// Absolute locations are returned unchanged; relative ones are joined onto
/// `scheme://host:port/` of `url`, ignoring its path and query.
pub fn resolve_location(url: &Url, location: &str) -> Result<Url, FetchError> {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);

    origin.join(location).map_err(|_| FetchError::InvalidLocation {
        url: url.clone(),
        location: location.to_string(),
    })
}

/// Strips parameters from a Content-Type value and lower-cases it
fn media_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Maps a transport error onto the fetch taxonomy, logging it
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        tracing::error!("Request timeout for {}", url);
        FetchError::RequestTimeout { url: url.clone() }
    } else {
        tracing::warn!("Request for {} failed: {}", url, error);
        FetchError::Network {
            url: url.clone(),
            source: error,
        }
    }
}
