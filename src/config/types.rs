use crate::crawler::{AddressingStyle, RelayEndpoint};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Archive-Scout
///
/// Every section is optional; an empty file yields the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    /// Root listing URL per category id
    #[serde(default)]
    pub roots: BTreeMap<String, String>,
    /// Additional categories, or replacements for built-in ones with the same id
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

/// Relay endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay endpoints in preference order
    pub endpoints: Vec<EndpointEntry>,

    /// Deadline for a single listing fetch attempt (milliseconds)
    #[serde(rename = "listing-timeout-ms")]
    pub listing_timeout_ms: u64,

    /// Deadline for a single file fetch attempt (milliseconds)
    #[serde(rename = "file-timeout-ms")]
    pub file_timeout_ms: u64,

    /// User-Agent header sent to relays; `archive-scout/<version>` when absent
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            listing_timeout_ms: 8_000,
            file_timeout_ms: 30_000,
            user_agent: None,
        }
    }
}

fn default_endpoints() -> Vec<EndpointEntry> {
    [
        "http://localhost:8001/?url=",
        "https://api.allorigins.win/raw?url=",
        "https://corsproxy.io/?",
        "https://api.codetabs.com/v1/proxy?quest=",
        "https://cors-anywhere.herokuapp.com/",
        "https://thingproxy.freeboard.io/fetch/",
    ]
    .into_iter()
    .map(|template| EndpointEntry::Template(template.to_string()))
    .collect()
}

/// One relay endpoint as written in the configuration file
///
/// Either a bare template string (addressing style inferred) or a table
/// with an explicit `style`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EndpointEntry {
    Template(String),
    Explicit {
        template: String,
        style: Option<AddressingStyle>,
    },
}

impl EndpointEntry {
    /// The address template of this entry
    pub fn template(&self) -> &str {
        match self {
            Self::Template(template) | Self::Explicit { template, .. } => template,
        }
    }

    /// Converts the entry into a relay endpoint
    pub fn to_endpoint(&self) -> RelayEndpoint {
        match self {
            Self::Template(template)
            | Self::Explicit {
                template,
                style: None,
            } => RelayEndpoint::new(template),
            Self::Explicit {
                template,
                style: Some(style),
            } => RelayEndpoint::with_style(template, *style),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of directory levels to read, the root included
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Pause between successive sub-directory descents (milliseconds)
    #[serde(rename = "descent-delay-ms")]
    pub descent_delay_ms: u64,

    /// Maximum number of candidate links processed per listing
    #[serde(rename = "max-links-per-listing")]
    pub max_links_per_listing: usize,

    /// Absolute link prefixes kept by the link filter (`host[/path]`)
    #[serde(rename = "allowed-external")]
    pub allowed_external: Vec<String>,

    /// Path fragments marking hosting-platform chrome rather than listings
    #[serde(rename = "denied-segments")]
    pub denied_segments: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            descent_delay_ms: 100,
            max_links_per_listing: 3_000,
            allowed_external: vec!["archive.org/download".to_string()],
            denied_segments: ["/details/", "/search/", "/account/", "/login/"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// A category declared in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Stable identifier (e.g., "nes")
    pub id: String,

    /// Human-readable name
    pub label: String,

    /// Accepted file extensions, with or without a leading dot
    pub extensions: Vec<String>,

    /// Root listing URL
    #[serde(rename = "root-url")]
    pub root_url: Option<String>,
}
