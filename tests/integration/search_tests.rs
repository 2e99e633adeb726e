//! Integration tests for category searches
//!
//! The relay is a wiremock server serving listings for virtual hosts, so
//! category roots never need to resolve.

use archive_scout::catalog::{Catalog, Category};
use archive_scout::config::parse_config;
use archive_scout::crawler::{
    self, build_http_client, DirectoryCrawler, RelayClient, RelayEndpoint, SearchCoordinator,
    SearchOutcome,
};
use archive_scout::ScoutError;
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_coordinator(server: &MockServer) -> SearchCoordinator {
    let relay = RelayClient::new(
        build_http_client(None).unwrap(),
        vec![RelayEndpoint::new(format!("{}/raw?url=", server.uri()))],
    )
    .with_timeouts(Duration::from_secs(2), Duration::from_secs(2));

    SearchCoordinator::new(DirectoryCrawler::new(relay).with_descent_delay(Duration::ZERO))
}

async fn mount_listing(server: &MockServer, target: &str, status: u16, files: &[&str]) {
    let anchors: String = files
        .iter()
        .map(|f| format!("<a href=\"{}\">{}</a>\n", f, f))
        .collect();
    let body = format!("<html><body><pre>\n{}</pre></body></html>", anchors);

    Mock::given(method("GET"))
        .and(path("/raw"))
        .and(query_param("url", target))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn category(id: &str, label: &str, extensions: &[&str], root: Option<&str>) -> Category {
    let category = Category::new(id, label, extensions.iter().copied());
    match root {
        Some(root) => category.with_root_url(Url::parse(root).unwrap()),
        None => category,
    }
}

#[tokio::test]
async fn test_unconfigured_category_makes_no_requests() {
    let server = MockServer::start().await;
    let coordinator = create_coordinator(&server);

    let outcome = coordinator
        .search_category(&category("nes", "NES", &["zip"], None), "")
        .await;

    assert_eq!(outcome, SearchOutcome::Unconfigured);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_text_filter_ignores_case_and_tags_category() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "http://listing.test/gba/",
        200,
        &["Super%20Mario%20Advance.gba", "Metroid%20Fusion.gba", "MARIO%20Kart.zip"],
    )
    .await;

    let coordinator = create_coordinator(&server);
    let gba = category(
        "gba",
        "Game Boy Advance",
        &["gba", "zip"],
        Some("http://listing.test/gba/"),
    );

    let outcome = coordinator.search_category(&gba, "mArIo").await;
    let names: Vec<&str> = outcome
        .hits()
        .iter()
        .map(|hit| hit.entry.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Super Mario Advance.gba", "MARIO Kart.zip"]);
    assert!(outcome
        .hits()
        .iter()
        .all(|hit| hit.category_id == "gba" && hit.category_label == "Game Boy Advance"));

    let unfiltered = coordinator.search_category(&gba, "").await;
    assert_eq!(unfiltered.len(), 3);

    let nothing = coordinator.search_category(&gba, "zelda").await;
    assert_eq!(nothing, SearchOutcome::Empty);
}

#[tokio::test]
async fn test_text_filter_keeps_surrounding_whitespace() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "http://listing.test/nes/",
        200,
        &["SuperMario.zip", "Super%20Mario.zip"],
    )
    .await;

    let coordinator = create_coordinator(&server);
    let nes = category("nes", "NES", &["zip"], Some("http://listing.test/nes/"));

    let outcome = coordinator.search_category(&nes, "super ").await;
    let names: Vec<&str> = outcome
        .hits()
        .iter()
        .map(|hit| hit.entry.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Super Mario.zip"]);

    // Whitespace alone is no filter at all
    let blank = coordinator.search_category(&nes, "   ").await;
    assert_eq!(blank.len(), 2);
}

#[tokio::test]
async fn test_categories_are_searched_concurrently() {
    let server = MockServer::start().await;
    let body = "<html><body><pre>\n<a href=\"Game.zip\">Game.zip</a>\n</pre></body></html>";
    for dir in ["a", "b"] {
        let target = format!("http://listing.test/{}/", dir);
        Mock::given(method("GET"))
            .and(path("/raw"))
            .and(query_param("url", target.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let catalog = Catalog::new(vec![
        category("a", "A", &["zip"], Some("http://listing.test/a/")),
        category("b", "B", &["zip"], Some("http://listing.test/b/")),
    ]);

    let coordinator = create_coordinator(&server);
    let started = Instant::now();
    let hits = coordinator.search_all(&catalog, "").await;
    let elapsed = started.elapsed();

    assert_eq!(hits.len(), 2);
    // Two 500ms listings in sequence would take at least a second
    assert!(elapsed < Duration::from_millis(900), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_search_all_merges_in_catalog_order() {
    let server = MockServer::start().await;
    mount_listing(&server, "http://listing.test/snes/", 200, &["Zelda.sfc", "F-Zero.smc"]).await;
    mount_listing(&server, "http://listing.test/broken/", 500, &[]).await;
    mount_listing(&server, "http://listing.test/nes/", 200, &["Zelda.nes", "Contra.zip"]).await;

    let catalog = Catalog::new(vec![
        category("snes", "SNES", &["sfc", "smc"], Some("http://listing.test/snes/")),
        category("gb", "Game Boy", &["gb"], Some("http://listing.test/broken/")),
        category("md", "Mega Drive", &["md"], None),
        category("nes", "NES", &["nes", "zip"], Some("http://listing.test/nes/")),
    ]);

    let coordinator = create_coordinator(&server);
    let outcomes = coordinator.search_all_outcomes(&catalog, "").await;

    let ids: Vec<&str> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["snes", "gb", "md", "nes"]);
    assert_eq!(outcomes[1].1, SearchOutcome::Empty);
    assert_eq!(outcomes[2].1, SearchOutcome::Unconfigured);

    let hits = coordinator.search_all(&catalog, "").await;
    let tagged: Vec<(&str, &str)> = hits
        .iter()
        .map(|hit| (hit.category_id.as_str(), hit.entry.display_name.as_str()))
        .collect();
    assert_eq!(
        tagged,
        vec![
            ("snes", "Zelda.sfc"),
            ("snes", "F-Zero.smc"),
            ("nes", "Zelda.nes"),
            ("nes", "Contra.zip"),
        ]
    );
}

#[tokio::test]
async fn test_search_all_equals_sum_of_single_searches() {
    let server = MockServer::start().await;
    mount_listing(&server, "http://listing.test/a/", 200, &["One.zip", "Two.zip"]).await;
    mount_listing(&server, "http://listing.test/b/", 200, &["Three.zip"]).await;

    let catalog = Catalog::new(vec![
        category("a", "A", &["zip"], Some("http://listing.test/a/")),
        category("b", "B", &["zip"], Some("http://listing.test/b/")),
    ]);

    let coordinator = create_coordinator(&server);
    let mut expected = 0;
    for category in catalog.iter() {
        expected += coordinator.search_category(category, "o").await.len();
    }

    let hits = coordinator.search_all(&catalog, "o").await;
    assert_eq!(hits.len(), expected);
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_search_from_config_reports_outcome_per_category() {
    let server = MockServer::start().await;
    mount_listing(&server, "http://listing.test/nes/", 200, &["Contra.zip", "Notes.txt"]).await;

    let config = parse_config(&format!(
        r#"
[relay]
endpoints = ["{}/raw?url="]

[crawler]
descent-delay-ms = 0

[roots]
nes = "http://listing.test/nes"
"#,
        server.uri()
    ))
    .unwrap();

    let single = crawler::search(&config, Some("nes"), "").await.unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].0, "nes");
    let names: Vec<&str> = single[0]
        .1
        .hits()
        .iter()
        .map(|hit| hit.entry.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Contra.zip"]);

    let unconfigured = crawler::search(&config, Some("snes"), "").await.unwrap();
    assert_eq!(unconfigured, vec![("snes".to_string(), SearchOutcome::Unconfigured)]);

    let all = crawler::search(&config, None, "contra").await.unwrap();
    assert_eq!(all.len(), Catalog::from_config(&config).unwrap().len());
    assert_eq!(all[0].0, "nes");
    assert_eq!(all[0].1.len(), 1);
    assert!(all[1..].iter().all(|(_, outcome)| outcome.is_unconfigured()));

    let unknown = crawler::search(&config, Some("atari"), "").await;
    assert!(matches!(unknown, Err(ScoutError::UnknownCategory(id)) if id == "atari"));
}
