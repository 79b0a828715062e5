use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and validates a crawl configuration from a TOML file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tidepool::config::load_config;
///
/// let config = load_config(Path::new("tidepool.toml")).unwrap();
/// println!("workers: {}", config.workers);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: CrawlConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
workers = 8
max-depth = 3
max-retries = 1
delay-ms = 100
allowed-domains = ["example.com", "docs.example.com"]
timeout-secs = 60
respect-robots = true
user-agent = "tidepool-test/0.1"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.delay_ms, 100);
        assert_eq!(config.allowed_domains.len(), 2);
        assert_eq!(config.timeout_secs, Some(60));
        assert!(config.respect_robots);
        assert_eq!(config.user_agent, "tidepool-test/0.1");
    }

    #[test]
    fn test_omitted_fields_fall_back_to_defaults() {
        let file = create_temp_config("workers = 2\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.max_depth, 2);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/tidepool.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = create_temp_config("max-deepness = 3\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_failure_surfaces() {
        let file = create_temp_config("workers = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
