use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Reason a URL was refused by the [`UriGate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("scheme '{0}' is not http or https")]
    SchemeRejected(String),

    #[error("domain '{0}' is not in the allow-list")]
    DomainRejected(String),
}

/// Scheme and domain allow-list filter
///
/// A URL passes when its scheme is `http` or `https` and its host is one of
/// the configured domains. Hosts are compared as exact strings; no case or
/// trailing-dot normalization is applied beyond what URL parsing does.
#[derive(Debug, Clone)]
pub struct UriGate {
    allowed: HashSet<String>,
}

impl UriGate {
    /// Creates a gate over the given allow-list
    pub fn new<I, S>(allowed_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed_domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks a URL, returning the rejection reason if it may not be crawled
    pub fn check(&self, url: &Url) -> Result<(), GateRejection> {
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(GateRejection::SchemeRejected(scheme.to_string()));
        }

        let host = url.host_str().unwrap_or_default();
        if !self.allowed.contains(host) {
            return Err(GateRejection::DomainRejected(host.to_string()));
        }

        Ok(())
    }

    /// Returns true if the URL may be crawled, logging the reason otherwise
    pub fn can_crawl(&self, url: &Url) -> bool {
        match self.check(url) {
            Ok(()) => true,
            Err(reason) => {
                tracing::info!("Skipping {}: {}", url, reason);
                false
            }
        }
    }

    /// Iterates over the allow-listed domains
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> UriGate {
        UriGate::new(["example.com", "docs.example.com"])
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_allows_http_and_https() {
        let gate = gate();
        assert!(gate.can_crawl(&url("http://example.com/")));
        assert!(gate.can_crawl(&url("https://docs.example.com/guide")));
    }

    #[test]
    fn test_rejects_other_schemes() {
        let gate = gate();
        assert_eq!(
            gate.check(&url("ftp://example.com/file")),
            Err(GateRejection::SchemeRejected("ftp".to_string()))
        );
        assert!(!gate.can_crawl(&url("mailto:admin@example.com")));
    }

    #[test]
    fn test_rejects_unlisted_domain() {
        let gate = gate();
        assert_eq!(
            gate.check(&url("https://other.com/")),
            Err(GateRejection::DomainRejected("other.com".to_string()))
        );
    }

    #[test]
    fn test_subdomains_are_not_implied() {
        let gate = UriGate::new(["example.com"]);
        assert!(!gate.can_crawl(&url("https://www.example.com/")));
    }

    #[test]
    fn test_trailing_dot_is_not_normalized() {
        let gate = UriGate::new(["example.com"]);
        assert!(!gate.can_crawl(&url("https://example.com./")));
    }

    #[test]
    fn test_scheme_checked_before_domain() {
        let gate = UriGate::new(["example.com"]);
        assert!(matches!(
            gate.check(&url("ftp://other.com/")),
            Err(GateRejection::SchemeRejected(_))
        ));
    }
}
