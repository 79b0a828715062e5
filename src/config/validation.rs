use crate::config::types::CrawlConfig;
use crate::ConfigError;

/// Validates a crawl configuration
///
/// Checks the constraints that would otherwise surface as confusing runtime
/// behavior: a zero-sized worker pool never makes progress, an empty user
/// agent is rejected by many servers, and an allow-list entry with spaces or
/// a scheme is almost certainly a pasted URL rather than a host.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.workers == 0 {
        return Err(ConfigError::Validation(
            "workers must be at least 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent must not be empty".to_string(),
        ));
    }

    if let Some(secs) = config.timeout_secs {
        if secs == 0 {
            return Err(ConfigError::Validation(
                "timeout-secs must be greater than zero".to_string(),
            ));
        }
    }

    for domain in &config.allowed_domains {
        if domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "allowed-domains entries must not be empty".to_string(),
            ));
        }
        if domain.contains('/') || domain.contains(' ') {
            return Err(ConfigError::Validation(format!(
                "allowed-domains entry is not a bare host: {}",
                domain
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&CrawlConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = CrawlConfig {
            workers: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let config = CrawlConfig {
            user_agent: "  ".to_string(),
            ..CrawlConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = CrawlConfig {
            timeout_secs: Some(0),
            ..CrawlConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_url_in_domain_list_rejected() {
        let config = CrawlConfig {
            allowed_domains: vec!["https://example.com/".to_string()],
            ..CrawlConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_plain_hosts_accepted() {
        let config = CrawlConfig {
            allowed_domains: vec!["example.com".to_string(), "docs.example.com".to_string()],
            ..CrawlConfig::default()
        };
        assert!(validate(&config).is_ok());
    }
}
