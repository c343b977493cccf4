//! Integration tests for the crawl, snapshot and diff cycle
//!
//! These tests use wiremock to serve small sites and drive the real
//! crawler against them end-to-end, persisting into SQLite.

use llms_txt_monitor::crawler::{sha256_hex, BrowserlessRenderer, CrawlLimits, Crawler, NoopRenderer};
use llms_txt_monitor::storage::SqliteStore;
use llms_txt_monitor::{MonitorError, PageType, SnapshotService};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Service = SnapshotService<Crawler, SqliteStore>;

/// Creates a service crawling with `limits`, no client-side rendering and
/// an in-memory database
fn create_test_service(limits: CrawlLimits) -> Service {
    let crawler = Crawler::new(limits, Arc::new(NoopRenderer)).expect("Failed to build crawler");
    let store = SqliteStore::open_in_memory().expect("Failed to open in-memory DB");
    SnapshotService::new(crawler, store)
}

/// Limits with a short timeout so unreachable URLs fail fast
fn test_limits() -> CrawlLimits {
    CrawlLimits {
        timeout: Duration::from_secs(5),
        ..CrawlLimits::default()
    }
}

/// Mounts an HTML page at `route`
async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Builds a page with a title and a list of links
fn page_html(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();

    format!(
        r#"<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>"#,
        title, body, anchors
    )
}

/// Mounts the three page site used by most tests: / links to /a and /b
async fn mount_small_site(server: &MockServer, a_body: &str, with_b: bool) {
    let links: &[&str] = if with_b { &["/a", "/b"] } else { &["/a"] };

    mount_page(server, "/", &page_html("Home", "Welcome", links)).await;
    mount_page(server, "/a", &page_html("A", a_body, &[])).await;
    if with_b {
        mount_page(server, "/b", &page_html("B", "Page B", &[])).await;
    }
}

#[tokio::test]
async fn test_first_crawl_reports_every_url_added() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, "Page A", true).await;

    let service = create_test_service(test_limits());
    let report = service.crawl_and_update(&base_url).await.expect("Update failed");

    assert_eq!(report.added.len(), 3, "added: {:?}", report.added);
    assert!(report.added.contains(&format!("{}/", base_url)));
    assert!(report.added.contains(&format!("{}/a", base_url)));
    assert!(report.added.contains(&format!("{}/b", base_url)));
    assert!(report.removed.is_empty());
    assert!(report.modified.is_empty());

    let pages = service.latest_pages(&base_url).expect("No snapshot stored");
    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|p| p.page_type == PageType::Page));

    let home = pages
        .iter()
        .find(|p| p.url == format!("{}/", base_url))
        .expect("Home page missing");
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.content_hash.len(), 64);
}

#[tokio::test]
async fn test_identical_recrawl_reports_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, "Page A", true).await;

    let service = create_test_service(test_limits());
    service.crawl_and_update(&base_url).await.expect("First update failed");
    let report = service.crawl_and_update(&base_url).await.expect("Second update failed");

    assert!(report.is_empty(), "unexpected changes: {}", report);
    assert_eq!(service.base_urls().unwrap(), vec![base_url]);
}

#[tokio::test]
async fn test_changed_text_is_reported_modified() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, "Old text", true).await;

    let service = create_test_service(test_limits());
    service.crawl_and_update(&base_url).await.expect("First update failed");

    // Same site, new text on /a
    mock_server.reset().await;
    mount_small_site(&mock_server, "New text", true).await;

    let report = service.crawl_and_update(&base_url).await.expect("Second update failed");

    assert!(report.added.is_empty());
    assert!(report.removed.is_empty());
    assert_eq!(
        report.modified.iter().cloned().collect::<Vec<_>>(),
        vec![format!("{}/a", base_url)]
    );
}

#[tokio::test]
async fn test_unlinked_page_is_reported_removed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, "Page A", true).await;

    let service = create_test_service(test_limits());
    service.crawl_and_update(&base_url).await.expect("First update failed");

    // The home page no longer links to /b
    mock_server.reset().await;
    mount_small_site(&mock_server, "Page A", false).await;

    let report = service.crawl_and_update(&base_url).await.expect("Second update failed");

    assert!(report.added.is_empty());
    assert_eq!(
        report.removed.iter().cloned().collect::<Vec<_>>(),
        vec![format!("{}/b", base_url)]
    );
    // The home page links changed, so its visible text changed too
    assert_eq!(
        report.modified.iter().cloned().collect::<Vec<_>>(),
        vec![format!("{}/", base_url)]
    );
}

#[tokio::test]
async fn test_scripts_are_fingerprinted_but_not_expanded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let script = b"console.log('hello');".to_vec();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title><script src="/app.js"></script>
        <link rel="stylesheet" href="/style.css"></head>
        <body><a href="/style.css">styles</a><a href="/logo.png">logo</a></body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(script.clone())
                .insert_header("content-type", "application/javascript"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Static asset links are never fetched
    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body {}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = create_test_service(test_limits());
    service.crawl_and_update(&base_url).await.expect("Update failed");

    let pages = service.latest_pages(&base_url).unwrap();
    assert_eq!(pages.len(), 2, "records: {:?}", pages);

    let asset = pages
        .iter()
        .find(|p| p.page_type == PageType::StaticAsset)
        .expect("Script not recorded");
    assert_eq!(asset.url, format!("{}/app.js", base_url));
    assert_eq!(asset.content_hash, sha256_hex(&script));
    assert_eq!(asset.title, None);
    assert_eq!(asset.description, None);
}

#[tokio::test]
async fn test_page_without_body_has_empty_text_hash() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "<html><head><title>Head only</title></head></html>",
    )
    .await;

    let service = create_test_service(test_limits());
    service.crawl_and_update(&base_url).await.expect("Update failed");

    let pages = service.latest_pages(&base_url).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title.as_deref(), Some("Head only"));
    assert_eq!(pages[0].content_hash, sha256_hex(""));
    assert_eq!(
        pages[0].content_hash,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[tokio::test]
async fn test_crawl_stays_on_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .port()
        .expect("Mock server has no port");

    // Same server under another host name is out of scope
    let other_host = format!("http://localhost:{}/other", port);
    mount_page(
        &mock_server,
        "/",
        &page_html("Home", "Welcome", &["/a", other_host.as_str(), "https://elsewhere.invalid/x"]),
    )
    .await;
    mount_page(&mock_server, "/a", &page_html("A", "Page A", &[])).await;

    Mock::given(method("GET"))
        .and(path("/other"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nope"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = create_test_service(test_limits());
    let report = service.crawl_and_update(&base_url).await.expect("Update failed");

    assert_eq!(report.added.len(), 2, "added: {:?}", report.added);
    assert!(report.added.iter().all(|url| url.starts_with(&base_url)));
}

#[tokio::test]
async fn test_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &page_html("Home", "Depth 0", &["/one"])).await;
    mount_page(&mock_server, "/one", &page_html("One", "Depth 1", &["/two"])).await;
    mount_page(&mock_server, "/two", &page_html("Two", "Depth 2", &[])).await;

    let limits = CrawlLimits {
        max_depth: 1,
        ..test_limits()
    };
    let crawler = Crawler::new(limits, Arc::new(NoopRenderer)).unwrap();
    let result = crawler.crawl(&base_url).await;

    let urls: Vec<_> = result.pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(
        urls,
        vec![format!("{}/", base_url), format!("{}/one", base_url)]
    );
    assert!(!result.interrupted);
}

#[tokio::test]
async fn test_page_cap_is_exact() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let children: Vec<String> = (0..10).map(|i| format!("/p{}", i)).collect();
    let links: Vec<&str> = children.iter().map(String::as_str).collect();
    mount_page(&mock_server, "/", &page_html("Home", "Hub", &links)).await;
    for child in &children {
        mount_page(&mock_server, child, &page_html(child, child, &[])).await;
    }

    let limits = CrawlLimits {
        max_pages: 4,
        ..test_limits()
    };
    let crawler = Crawler::new(limits, Arc::new(NoopRenderer)).unwrap();
    let result = crawler.crawl(&base_url).await;

    assert_eq!(result.pages.len(), 4);
    assert_eq!(result.pages[0].url, format!("{}/", base_url));

    let mut urls: Vec<_> = result.pages.iter().map(|p| p.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 4, "duplicate records");
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &page_html("Home", "Welcome", &["/ok", "/missing", "/broken", "/data.json"]),
    )
    .await;
    mount_page(&mock_server, "/ok", &page_html("Ok", "Fine", &[])).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .insert_header("content-type", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let service = create_test_service(test_limits());
    let report = service.crawl_and_update(&base_url).await.expect("Update failed");

    let added: Vec<_> = report.added.iter().cloned().collect();
    assert_eq!(
        added,
        vec![format!("{}/", base_url), format!("{}/ok", base_url)]
    );
}

#[tokio::test]
async fn test_client_rendered_page_uses_browserless_dom() {
    let site = MockServer::start().await;
    let browserless = MockServer::start().await;
    let base_url = site.uri();

    // Shell with a framework mount point
    mount_page(
        &site,
        "/",
        r#"<html><head><title>Loading</title></head><body><div id="root"></div></body></html>"#,
    )
    .await;

    let rendered = format!(
        r#"<html><head><title>Rendered</title>
        <meta name="description" content="Hydrated page"></head>
        <body><div id="root"><h1>Dashboard</h1><p>{}</p></div></body></html>"#,
        "Lots of hydrated content. ".repeat(20)
    );

    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rendered)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&browserless)
        .await;

    let renderer = BrowserlessRenderer::new(&browserless.uri(), None, Duration::from_secs(5))
        .expect("Failed to build renderer");
    let crawler = Crawler::new(test_limits(), Arc::new(renderer)).unwrap();
    let service = SnapshotService::new(crawler, SqliteStore::open_in_memory().unwrap());

    service.crawl_and_update(&base_url).await.expect("Update failed");

    let pages = service.latest_pages(&base_url).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title.as_deref(), Some("Rendered"));
    assert_eq!(pages[0].description.as_deref(), Some("Hydrated page"));
}

#[tokio::test]
async fn test_recrawl_fresh_replaces_history() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, "Page A", true).await;

    let service = create_test_service(test_limits());
    service.crawl_and_update(&base_url).await.expect("First update failed");
    service.crawl_and_update(&base_url).await.expect("Second update failed");

    let snapshot = service.recrawl_fresh(&base_url).await.expect("Fresh crawl failed");
    assert_eq!(snapshot.base_url, base_url);

    let stats = service.statistics(&[]).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].snapshot_id, Some(snapshot.id));
    assert_eq!(stats[0].pages, 3);
}

#[tokio::test]
async fn test_llms_txt_of_latest_snapshot() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, "Page A", true).await;

    let service = create_test_service(test_limits());

    let err = service.latest_text(&base_url).unwrap_err();
    assert!(matches!(err, MonitorError::NotFound { .. }));

    service.crawl_and_update(&base_url).await.expect("Update failed");

    let text = service.latest_text(&base_url).unwrap();
    assert!(text.starts_with(&format!("# llms.txt generated for {}\n", base_url)));
    assert!(text.contains(&format!("URL: {}/a\nTITLE: A\n", base_url)));
}

#[tokio::test]
async fn test_snapshots_survive_reopen() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, "Page A", true).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("llms-txt.db");

    {
        let crawler = Crawler::new(test_limits(), Arc::new(NoopRenderer)).unwrap();
        let store = SqliteStore::new(&db_path).expect("Failed to open DB");
        let service = SnapshotService::new(crawler, store);
        service.crawl_and_update(&base_url).await.expect("First update failed");
    }

    let crawler = Crawler::new(test_limits(), Arc::new(NoopRenderer)).unwrap();
    let store = SqliteStore::new(&db_path).expect("Failed to reopen DB");
    let service = SnapshotService::new(crawler, store);

    let report = service.crawl_and_update(&base_url).await.expect("Second update failed");
    assert!(report.is_empty(), "unexpected changes: {}", report);
}
