//! Integration tests for relay endpoint fallback
//!
//! These tests use wiremock to stand in for the relay services and check
//! request construction, body classification and fallback order.

use archive_scout::crawler::{
    build_http_client, AddressingStyle, AttemptOutcome, BodyVerdict, RelayClient, RelayEndpoint,
};
use std::time::Duration;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "http://listing.test/roms/";

const LISTING: &str = r#"<html><body><pre>
<a href="../">../</a>
<a href="Contra.zip">Contra.zip</a>
</pre></body></html>"#;

const CAPTCHA_PAGE: &str = r#"<html><body><a href="/">home</a>
<div>Please complete the captcha to continue</div></body></html>"#;

const CLOUDFLARE_PAGE: &str = r#"<html><head><title>Attention Required! | Cloudflare</title></head>
<body><a href="https://www.cloudflare.com/">cloudflare</a></body></html>"#;

fn relay_client(endpoints: Vec<RelayEndpoint>) -> RelayClient {
    RelayClient::new(build_http_client(None).unwrap(), endpoints)
        .with_timeouts(Duration::from_millis(500), Duration::from_millis(500))
}

fn query_relay(server: &MockServer, name: &str) -> RelayEndpoint {
    RelayEndpoint::new(format!("{}/{}?url=", server.uri(), name))
}

async fn mount_relay(server: &MockServer, name: &str, response: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", name)))
        .and(query_param("url", TARGET))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_falls_back_past_blocked_pages_in_order() {
    let server = MockServer::start().await;

    mount_relay(
        &server,
        "r1",
        ResponseTemplate::new(200).set_body_string(CAPTCHA_PAGE),
        1,
    )
    .await;
    mount_relay(
        &server,
        "r2",
        ResponseTemplate::new(200).set_body_string(CLOUDFLARE_PAGE),
        1,
    )
    .await;
    mount_relay(
        &server,
        "r3",
        ResponseTemplate::new(200).set_body_string(LISTING),
        1,
    )
    .await;

    let client = relay_client(vec![
        query_relay(&server, "r1"),
        query_relay(&server, "r2"),
        query_relay(&server, "r3"),
    ]);

    let body = client.fetch_listing(TARGET).await;
    assert_eq!(body.as_deref(), Some(LISTING));

    let requests = server.received_requests().await.unwrap();
    let order: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(order, vec!["/r1", "/r2", "/r3"]);
}

#[tokio::test]
async fn test_stops_at_first_accepted_listing() {
    let server = MockServer::start().await;

    mount_relay(
        &server,
        "r1",
        ResponseTemplate::new(200).set_body_string(LISTING),
        1,
    )
    .await;
    mount_relay(
        &server,
        "r2",
        ResponseTemplate::new(200).set_body_string(LISTING),
        0,
    )
    .await;

    let client = relay_client(vec![query_relay(&server, "r1"), query_relay(&server, "r2")]);
    assert!(client.fetch_listing(TARGET).await.is_some());
}

#[tokio::test]
async fn test_error_status_and_markdown_fall_through() {
    let server = MockServer::start().await;

    mount_relay(&server, "r1", ResponseTemplate::new(502), 1).await;
    mount_relay(
        &server,
        "r2",
        ResponseTemplate::new(200).set_body_string("Title: Index\n\nMarkdown Content:\n* Contra.zip"),
        1,
    )
    .await;
    mount_relay(
        &server,
        "r3",
        ResponseTemplate::new(200).set_body_string(LISTING),
        1,
    )
    .await;

    let client = relay_client(vec![
        query_relay(&server, "r1"),
        query_relay(&server, "r2"),
        query_relay(&server, "r3"),
    ]);
    assert_eq!(client.fetch_listing(TARGET).await.as_deref(), Some(LISTING));
}

#[tokio::test]
async fn test_slow_relay_is_abandoned_after_deadline() {
    let server = MockServer::start().await;

    mount_relay(
        &server,
        "slow",
        ResponseTemplate::new(200)
            .set_body_string(LISTING)
            .set_delay(Duration::from_secs(2)),
        1,
    )
    .await;
    mount_relay(
        &server,
        "fast",
        ResponseTemplate::new(200).set_body_string(LISTING),
        1,
    )
    .await;

    let client = RelayClient::new(
        build_http_client(None).unwrap(),
        vec![query_relay(&server, "slow"), query_relay(&server, "fast")],
    )
    .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));

    let started = std::time::Instant::now();
    assert!(client.fetch_listing(TARGET).await.is_some());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_exhausted_relays_return_none() {
    let server = MockServer::start().await;

    mount_relay(&server, "r1", ResponseTemplate::new(404), 1).await;
    mount_relay(
        &server,
        "r2",
        ResponseTemplate::new(200).set_body_string("<html><body>nothing here</body></html>"),
        1,
    )
    .await;

    let client = relay_client(vec![query_relay(&server, "r1"), query_relay(&server, "r2")]);
    assert_eq!(client.fetch_listing(TARGET).await, None);
}

#[tokio::test]
async fn test_unreachable_relay_is_skipped() {
    let server = MockServer::start().await;
    mount_relay(
        &server,
        "r1",
        ResponseTemplate::new(200).set_body_string(LISTING),
        1,
    )
    .await;

    let client = relay_client(vec![
        RelayEndpoint::new("http://127.0.0.1:9/?url="),
        query_relay(&server, "r1"),
    ]);
    assert!(client.fetch_listing(TARGET).await.is_some());
}

#[tokio::test]
async fn test_path_append_relay_receives_raw_target() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/fetch/http:/+listing\.test/roms/$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = RelayEndpoint::new(format!("{}/fetch/", server.uri()));
    assert_eq!(endpoint.style(), AddressingStyle::PathAppend);

    let client = relay_client(vec![endpoint]);
    assert!(client.fetch_listing(TARGET).await.is_some());
}

#[tokio::test]
async fn test_fetch_file_returns_bytes_without_classification() {
    let server = MockServer::start().await;
    let archive_url = "http://listing.test/roms/Contra.zip";

    Mock::given(method("GET"))
        .and(path("/r1"))
        .and(query_param("url", archive_url))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r2"))
        .and(query_param("url", archive_url))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04])
                .insert_header("content-type", "application/zip"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = relay_client(vec![query_relay(&server, "r1"), query_relay(&server, "r2")]);
    let file = client.fetch_file(archive_url).await.expect("file fetched");

    assert_eq!(file.bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    assert_eq!(file.content_type.as_deref(), Some("application/zip"));
    assert_eq!(file.endpoint, query_relay(&server, "r2"));
}

#[tokio::test]
async fn test_probe_reports_every_endpoint() {
    let server = MockServer::start().await;

    mount_relay(
        &server,
        "r1",
        ResponseTemplate::new(200).set_body_string(LISTING),
        1,
    )
    .await;
    mount_relay(
        &server,
        "r2",
        ResponseTemplate::new(200).set_body_string(CAPTCHA_PAGE),
        1,
    )
    .await;
    mount_relay(&server, "r3", ResponseTemplate::new(429), 1).await;

    let client = relay_client(vec![
        query_relay(&server, "r1"),
        query_relay(&server, "r2"),
        query_relay(&server, "r3"),
    ]);

    let reports = client.probe(TARGET).await;
    assert_eq!(reports.len(), 3);
    assert!(reports[0].outcome.is_accepted());
    assert_eq!(
        reports[1].outcome,
        AttemptOutcome::Rejected(BodyVerdict::Blocked)
    );
    assert_eq!(reports[2].outcome, AttemptOutcome::Status(429));
}

#[tokio::test]
async fn test_default_user_agent_names_the_crate() {
    let server = MockServer::start().await;
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Mock::given(method("GET"))
        .and(path("/r1"))
        .and(header("user-agent", user_agent.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .expect(1)
        .mount(&server)
        .await;

    let client = relay_client(vec![query_relay(&server, "r1")]);
    assert!(client.fetch_listing(TARGET).await.is_some());
}
