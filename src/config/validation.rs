use crate::config::types::{Config, CrawlerConfig, MonitorConfig, OutputConfig, RendererConfig, SiteEntry};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    if let Some(renderer) = &config.renderer {
        validate_renderer_config(renderer)?;
    }
    validate_monitor_config(&config.monitor)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout_ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.csr_threshold_bytes < 1 {
        return Err(ConfigError::Validation(format!(
            "csr_threshold_bytes must be >= 1, got {}",
            config.csr_threshold_bytes
        )));
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.browserless_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid browserless_url '{}': {}",
            config.browserless_url, e
        ))
    })?;
    require_http(&url, "browserless_url")?;

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "renderer timeout_ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    Ok(())
}

/// Validates monitor configuration
fn validate_monitor_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    if config.interval_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "interval_ms must be >= 1000ms, got {}ms",
            config.interval_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the `[[site]]` entries
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    for site in sites {
        let url = Url::parse(&site.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", site.url, e))
        })?;
        require_http(&url, "site URL")?;
    }

    Ok(())
}

/// Requires an http(s) URL with a host
fn require_http(url: &Url, what: &str) -> Result<(), ConfigError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use the http or https scheme",
            what, url
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            what, url
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(url: &str) -> SiteEntry {
        SiteEntry {
            url: url.to_string(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut crawler = CrawlerConfig::default();
        crawler.concurrency = 0;
        assert!(validate_crawler_config(&crawler).is_err());
        crawler.concurrency = 101;
        assert!(validate_crawler_config(&crawler).is_err());
        crawler.concurrency = 100;
        assert!(validate_crawler_config(&crawler).is_ok());
    }

    #[test]
    fn test_crawler_minimums() {
        let mut crawler = CrawlerConfig::default();
        crawler.max_pages = 0;
        assert!(validate_crawler_config(&crawler).is_err());

        let mut crawler = CrawlerConfig::default();
        crawler.timeout_ms = 99;
        assert!(validate_crawler_config(&crawler).is_err());

        let mut crawler = CrawlerConfig::default();
        crawler.csr_threshold_bytes = 0;
        assert!(validate_crawler_config(&crawler).is_err());

        let mut crawler = CrawlerConfig::default();
        crawler.max_depth = 0;
        assert!(validate_crawler_config(&crawler).is_ok());
    }

    #[test]
    fn test_monitor_interval_minimum() {
        assert!(validate_monitor_config(&MonitorConfig { interval_ms: 999 }).is_err());
        assert!(validate_monitor_config(&MonitorConfig { interval_ms: 1000 }).is_ok());
    }

    #[test]
    fn test_output_path_required() {
        let output = OutputConfig {
            database_path: "  ".to_string(),
        };
        assert!(validate_output_config(&output).is_err());
    }

    #[test]
    fn test_site_urls() {
        assert!(validate_sites(&[site("https://example.com/"), site("http://127.0.0.1:8080")]).is_ok());

        for bad in ["example.com", "ftp://example.com/", "file:///tmp/x", "not a url"] {
            let result = validate_sites(&[site(bad)]);
            assert!(matches!(result, Err(ConfigError::InvalidUrl(_))), "{}", bad);
        }
    }

    #[test]
    fn test_renderer_url() {
        let renderer = RendererConfig {
            browserless_url: "localhost:3000".to_string(),
            token: None,
            timeout_ms: 30_000,
        };
        assert!(validate_renderer_config(&renderer).is_err());

        let renderer = RendererConfig {
            browserless_url: "http://localhost:3000".to_string(),
            token: None,
            timeout_ms: 30_000,
        };
        assert!(validate_renderer_config(&renderer).is_ok());
    }
}
