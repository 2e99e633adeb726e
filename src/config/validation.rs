use crate::catalog::builtin_categories;
use crate::config::types::{CategoryEntry, Config, CrawlerConfig, RelayConfig};
use crate::ConfigError;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_relay_config(&config.relay)?;
    validate_crawler_config(&config.crawler)?;
    validate_categories(&config.categories)?;
    validate_roots(&config.roots, &config.categories)?;
    Ok(())
}

/// Validates relay configuration
fn validate_relay_config(config: &RelayConfig) -> Result<(), ConfigError> {
    if config.endpoints.is_empty() {
        return Err(ConfigError::Validation(
            "at least one relay endpoint is required".to_string(),
        ));
    }

    for entry in &config.endpoints {
        validate_http_url(entry.template(), "relay endpoint")?;
    }

    if config.listing_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "listing-timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.file_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "file-timeout-ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 || config.max_depth > 8 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be between 1 and 8, got {}",
            config.max_depth
        )));
    }

    if config.max_links_per_listing < 1 {
        return Err(ConfigError::Validation(
            "max-links-per-listing must be >= 1".to_string(),
        ));
    }

    if let Some(entry) = config.allowed_external.iter().find(|e| e.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "allowed-external entries cannot be empty, got '{}'",
            entry
        )));
    }

    Ok(())
}

/// Validates categories declared in the configuration file
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in categories {
        if entry.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category id cannot be empty".to_string(),
            ));
        }

        if !seen.insert(entry.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' is declared more than once",
                entry.id
            )));
        }

        if entry
            .extensions
            .iter()
            .all(|ext| ext.trim_start_matches('.').trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "category '{}' must accept at least one file extension",
                entry.id
            )));
        }

        if let Some(root) = entry.root_url.as_deref().filter(|r| !r.trim().is_empty()) {
            validate_http_url(root, "root-url")?;
        }
    }

    Ok(())
}

/// Validates the per-category root URL table
fn validate_roots(
    roots: &BTreeMap<String, String>,
    categories: &[CategoryEntry],
) -> Result<(), ConfigError> {
    let builtin = builtin_categories();

    for (id, root) in roots {
        let known = builtin.iter().any(|c| &c.id == id) || categories.iter().any(|c| &c.id == id);
        if !known {
            return Err(ConfigError::Validation(format!(
                "root URL given for unknown category '{}'",
                id
            )));
        }

        if !root.trim().is_empty() {
            validate_http_url(root, "root URL")?;
        }
    }

    Ok(())
}

/// Checks that a value parses as an HTTP(S) URL
fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            what, value
        )));
    }

    Ok(())
}
