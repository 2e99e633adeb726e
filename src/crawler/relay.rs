//! Relay client implementation
//!
//! Target listings are never fetched directly. Each request goes through
//! one of a ranked list of relay endpoints, and this module handles:
//! - Building the relay request address for each addressing style
//! - Bounding every attempt by its own deadline
//! - Classifying response bodies (real listing, block page, markdown)
//! - Falling back to the next endpoint on any failure

use crate::config::RelayConfig;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for one listing fetch attempt
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(8);

/// Default deadline for one file fetch attempt
pub const FILE_TIMEOUT: Duration = Duration::from_secs(30);

/// How a relay expects the target URL to be passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressingStyle {
    /// Template ends with a named query parameter (`...?url=`); the target
    /// is percent-encoded as its value
    QueryParam,
    /// Template ends with a bare `?`; the target is percent-encoded as the
    /// whole query
    QueryNoParam,
    /// The raw target URL is appended to the template
    PathAppend,
}

impl AddressingStyle {
    /// Infers the addressing style from the shape of a template
    pub fn infer(template: &str) -> Self {
        if template.ends_with('=') {
            Self::QueryParam
        } else if template.ends_with('?') {
            Self::QueryNoParam
        } else {
            Self::PathAppend
        }
    }
}

/// A relay service able to forward a GET to an arbitrary target URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    template: String,
    style: AddressingStyle,
}

impl RelayEndpoint {
    /// Creates an endpoint whose addressing style is inferred from the template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let style = AddressingStyle::infer(&template);
        Self { template, style }
    }

    /// Creates an endpoint with an explicit addressing style
    pub fn with_style(template: impl Into<String>, style: AddressingStyle) -> Self {
        Self {
            template: template.into(),
            style,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn style(&self) -> AddressingStyle {
        self.style
    }

    /// Builds the address to request from this relay for `target`
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_scout::crawler::RelayEndpoint;
    ///
    /// let relay = RelayEndpoint::new("https://relay.example/raw?url=");
    /// assert_eq!(
    ///     relay.request_url("https://h.example/a b/"),
    ///     "https://relay.example/raw?url=https%3A%2F%2Fh.example%2Fa%20b%2F"
    /// );
    ///
    /// let relay = RelayEndpoint::new("https://relay.example/fetch/");
    /// assert_eq!(
    ///     relay.request_url("https://h.example/a/"),
    ///     "https://relay.example/fetch/https://h.example/a/"
    /// );
    /// ```
    pub fn request_url(&self, target: &str) -> String {
        match self.style {
            AddressingStyle::QueryParam | AddressingStyle::QueryNoParam => {
                format!("{}{}", self.template, urlencoding::encode(target))
            }
            AddressingStyle::PathAppend => format!("{}{}", self.template, target),
        }
    }
}

/// Verdict on a successful relay response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyVerdict {
    /// Looks like an HTML directory listing
    Listing,
    /// No anchor elements at all
    NoAnchors,
    /// Access-denied, captcha or interstitial page
    Blocked,
    /// The relay rendered the page to markdown/plain text
    Markdown,
}

/// Classifies a response body returned by a relay
///
/// Matching is case-insensitive. Markdown and block signatures win over
/// the presence of anchors.
pub fn classify_body(body: &str) -> BodyVerdict {
    let lower = body.to_lowercase();

    if lower.contains("markdown content:") || lower.contains("______") {
        return BodyVerdict::Markdown;
    }

    let blocked = lower.contains("error 403")
        || lower.contains("access denied")
        || lower.contains("captcha")
        || (lower.contains("cloudflare") && lower.contains("attention required"));
    if blocked {
        return BodyVerdict::Blocked;
    }

    if lower.contains("<a ") && lower.contains("href=") {
        BodyVerdict::Listing
    } else {
        BodyVerdict::NoAnchors
    }
}

/// Result of a single attempt against one relay endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The body passed classification
    Accepted(String),
    /// The relay answered with a body that is not a usable listing
    Rejected(BodyVerdict),
    /// Non-success HTTP status
    Status(u16),
    /// The attempt did not finish before its deadline
    TimedOut,
    /// Connection or protocol failure
    Network(String),
}

impl AttemptOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// One-line description for logs and relay diagnostics
    pub fn summary(&self) -> String {
        match self {
            Self::Accepted(body) => format!("ok ({} bytes)", body.len()),
            Self::Rejected(verdict) => format!("rejected: {:?}", verdict),
            Self::Status(code) => format!("HTTP {}", code),
            Self::TimedOut => "timed out".to_string(),
            Self::Network(error) => format!("network error: {}", error),
        }
    }
}

/// Outcome of probing one endpoint
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub endpoint: RelayEndpoint,
    pub outcome: AttemptOutcome,
}

/// Bytes of a file retrieved through a relay
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    /// Content-Type header value, when the relay sent one
    pub content_type: Option<String>,
    /// The endpoint that served the file
    pub endpoint: RelayEndpoint,
}

enum Fetched<T> {
    Body(T, Option<String>),
    Status(u16),
}

/// Builds the HTTP client used for all relay requests
///
/// Requests carry no cookies or credentials. Deadlines are applied per
/// attempt by [`RelayClient`], so only a connect timeout is set here.
pub fn build_http_client(user_agent: Option<&str>) -> Result<Client, reqwest::Error> {
    let user_agent = user_agent
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Stateless client fetching target URLs through ranked relay endpoints
///
/// Cloning is cheap; clones share the connection pool and endpoint list.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    endpoints: Arc<[RelayEndpoint]>,
    listing_timeout: Duration,
    file_timeout: Duration,
}

impl RelayClient {
    /// Creates a client over `endpoints` (preference order) with default deadlines
    pub fn new(client: Client, endpoints: Vec<RelayEndpoint>) -> Self {
        Self {
            client,
            endpoints: endpoints.into(),
            listing_timeout: LISTING_TIMEOUT,
            file_timeout: FILE_TIMEOUT,
        }
    }

    /// Creates a client from the `[relay]` configuration section
    pub fn from_config(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config.user_agent.as_deref())?;
        let endpoints = config.endpoints.iter().map(|e| e.to_endpoint()).collect();

        Ok(Self::new(client, endpoints).with_timeouts(
            Duration::from_millis(config.listing_timeout_ms),
            Duration::from_millis(config.file_timeout_ms),
        ))
    }

    /// Overrides the per-attempt deadlines
    pub fn with_timeouts(mut self, listing: Duration, file: Duration) -> Self {
        self.listing_timeout = listing;
        self.file_timeout = file;
        self
    }

    pub fn endpoints(&self) -> &[RelayEndpoint] {
        &self.endpoints
    }

    /// Fetches a directory listing, trying each endpoint in order
    ///
    /// Returns the first body classified as a listing, or `None` once every
    /// endpoint has failed. Exhaustion is a normal outcome, not an error.
    pub async fn fetch_listing(&self, target: &str) -> Option<String> {
        for (idx, endpoint) in self.endpoints.iter().enumerate() {
            let outcome = self.attempt(endpoint, target, self.listing_timeout).await;
            tracing::debug!(
                "Relay {}/{} ({}) for {}: {}",
                idx + 1,
                self.endpoints.len(),
                endpoint.template(),
                target,
                outcome.summary()
            );

            if let AttemptOutcome::Accepted(body) = outcome {
                return Some(body);
            }
        }

        tracing::warn!("All {} relays failed for {}", self.endpoints.len(), target);
        None
    }

    /// Makes one attempt at fetching a listing through `endpoint`
    ///
    /// `deadline` bounds the whole attempt, body included. A timed-out
    /// attempt is dropped; nothing is retried here.
    pub async fn attempt(
        &self,
        endpoint: &RelayEndpoint,
        target: &str,
        deadline: Duration,
    ) -> AttemptOutcome {
        let request_url = endpoint.request_url(target);

        match tokio::time::timeout(deadline, get_text(&self.client, &request_url)).await {
            Err(_) => AttemptOutcome::TimedOut,
            Ok(Err(e)) if e.is_timeout() => AttemptOutcome::TimedOut,
            Ok(Err(e)) => AttemptOutcome::Network(e.to_string()),
            Ok(Ok(Fetched::Status(code))) => AttemptOutcome::Status(code),
            Ok(Ok(Fetched::Body(body, _))) => match classify_body(&body) {
                BodyVerdict::Listing => AttemptOutcome::Accepted(body),
                verdict => AttemptOutcome::Rejected(verdict),
            },
        }
    }

    /// Fetches the bytes of a file, trying each endpoint in order
    ///
    /// Uses the longer file deadline and skips body classification.
    pub async fn fetch_file(&self, target: &str) -> Option<FetchedFile> {
        for (idx, endpoint) in self.endpoints.iter().enumerate() {
            let request_url = endpoint.request_url(target);
            let result =
                tokio::time::timeout(self.file_timeout, get_bytes(&self.client, &request_url))
                    .await;

            match result {
                Ok(Ok(Fetched::Body(bytes, content_type))) => {
                    tracing::debug!(
                        "File relay {} ({}) served {} bytes for {}",
                        idx + 1,
                        endpoint.template(),
                        bytes.len(),
                        target
                    );
                    return Some(FetchedFile {
                        bytes,
                        content_type,
                        endpoint: endpoint.clone(),
                    });
                }
                Ok(Ok(Fetched::Status(code))) => {
                    tracing::debug!("File relay {} returned HTTP {}", idx + 1, code);
                }
                Ok(Err(e)) => {
                    tracing::debug!("File relay {} failed: {}", idx + 1, e);
                }
                Err(_) => {
                    tracing::debug!(
                        "File relay {} timed out after {:?}",
                        idx + 1,
                        self.file_timeout
                    );
                }
            }
        }

        tracing::warn!("All {} relays failed to fetch file {}", self.endpoints.len(), target);
        None
    }

    /// Tries every endpoint independently against `target`
    ///
    /// Unlike [`fetch_listing`](Self::fetch_listing) this does not stop at
    /// the first success; it reports how each relay currently behaves.
    pub async fn probe(&self, target: &str) -> Vec<ProbeReport> {
        let mut reports = Vec::with_capacity(self.endpoints.len());
        for endpoint in self.endpoints.iter() {
            let outcome = self.attempt(endpoint, target, self.listing_timeout).await;
            reports.push(ProbeReport {
                endpoint: endpoint.clone(),
                outcome,
            });
        }
        reports
    }
}

async fn get_text(client: &Client, url: &str) -> Result<Fetched<String>, reqwest::Error> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Ok(Fetched::Status(status.as_u16()));
    }
    let content_type = content_type_of(&response);
    Ok(Fetched::Body(response.text().await?, content_type))
}

async fn get_bytes(client: &Client, url: &str) -> Result<Fetched<Vec<u8>>, reqwest::Error> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Ok(Fetched::Status(status.as_u16()));
    }
    let content_type = content_type_of(&response);
    Ok(Fetched::Body(response.bytes().await?.to_vec(), content_type))
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
