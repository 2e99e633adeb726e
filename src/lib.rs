//! Archive-Scout: finds downloadable archives in relayed directory listings
//!
//! This crate crawls web-server directory indexes for game platform
//! categories. Listings are fetched through a ranked list of relay
//! endpoints, anchors are classified into sub-directories and matching
//! files, and per-category crawls can be fanned out concurrently.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod url;

use thiserror::Error;

/// Main error type for Archive-Scout operations
///
/// Searches themselves never fail; these errors come from set-up paths
/// such as loading configuration or building the HTTP client.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Archive-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use catalog::{Catalog, Category};
pub use config::Config;
pub use crawler::{
    classify, CrawlEntry, DirectoryCrawler, LinkKind, RelayClient, RelayEndpoint, SearchCoordinator,
    SearchHit, SearchOutcome,
};
pub use crate::url::normalize_root_url;
