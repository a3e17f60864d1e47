use crate::config::types::Config;
use crate::ConfigError;
use tokio::sync::Semaphore;
use url::Url;

/// Validates the entire configuration
///
/// Option checks run first; start URIs are checked last so that every
/// offending URI is reported in a single [`ConfigError::InvalidSeeds`].
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_allowed_domains(&config.allowed_domains)?;
    validate_limits(config)?;
    validate_start_uris(&config.start_uris)?;
    Ok(())
}

/// Validates the allow-list
fn validate_allowed_domains(domains: &[String]) -> Result<(), ConfigError> {
    if domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains must list at least one host".to_string(),
        ));
    }

    if let Some(bad) = domains
        .iter()
        .find(|d| d.trim().is_empty() || d.contains('/'))
    {
        return Err(ConfigError::Validation(format!(
            "allowed-domains entries must be bare host names, got '{}'",
            bad
        )));
    }

    Ok(())
}

/// Validates numeric limits
fn validate_limits(config: &Config) -> Result<(), ConfigError> {
    if config.max_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be >= 1, got {}",
            config.max_workers
        )));
    }

    if config.max_workers > Semaphore::MAX_PERMITS {
        return Err(ConfigError::Validation(format!(
            "max-workers must be <= {}, got {}",
            Semaphore::MAX_PERMITS,
            config.max_workers
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be >= 1 second, got {}",
            config.request_timeout
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates start URIs, collecting every non-absolute entry
fn validate_start_uris(uris: &[String]) -> Result<(), ConfigError> {
    if uris.is_empty() {
        return Err(ConfigError::Validation(
            "start-uris must list at least one URI".to_string(),
        ));
    }

    let invalid: Vec<String> = uris
        .iter()
        .filter(|uri| Url::parse(uri).is_err())
        .cloned()
        .collect();

    if !invalid.is_empty() {
        return Err(ConfigError::InvalidSeeds(invalid));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            allowed_domains: vec!["example.com".to_string()],
            start_uris: vec!["https://example.com/".to_string()],
            max_workers: 2,
            ..Config::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_reports_all_invalid_seeds() {
        let mut config = valid_config();
        config.start_uris = vec![
            "/relative".to_string(),
            "https://example.com/ok".to_string(),
            "example.com/no-scheme".to_string(),
        ];

        match validate(&config) {
            Err(ConfigError::InvalidSeeds(bad)) => {
                assert_eq!(
                    bad,
                    vec!["/relative".to_string(), "example.com/no-scheme".to_string()]
                );
            }
            other => panic!("expected InvalidSeeds, got {:?}", other),
        }
    }

    #[test]
    fn test_requires_domains_and_seeds() {
        let mut config = valid_config();
        config.allowed_domains.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        let mut config = valid_config();
        config.start_uris.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = valid_config();
        config.max_workers = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.request_timeout = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_worker_count_beyond_pool_capacity() {
        let mut config = valid_config();
        config.max_workers = usize::MAX;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.max_workers = Semaphore::MAX_PERMITS + 1;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.max_workers = Semaphore::MAX_PERMITS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_malformed_domain_entry() {
        let mut config = valid_config();
        config.allowed_domains.push("https://example.com/".to_string());
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }
}
