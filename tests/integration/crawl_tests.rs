//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the HTTP gateway and the full crawl cycle end-to-end.

use linkspector::config::{Config, CrawlOptions, NonRecursiveScope};
use linkspector::crawler::{crawl, Coordinator, FetchError, FetchGateway, HttpGateway};
use linkspector::output::summarize;
use std::net::TcpListener;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(status: u16, body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.into(), "text/html; charset=utf-8")
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page)).expect("Failed to build page URL")
}

fn recursive_config() -> Config {
    let mut config = Config::default();
    config.crawl.recursive = true;
    config.crawl.timeout_seconds = 5;
    config
}

#[tokio::test]
async fn test_gateway_fetches_html_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(200, "<html><body><a href=\"/a\">A</a></body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&CrawlOptions::default()).expect("Failed to create gateway");
    let response = gateway
        .fetch(&page_url(&mock_server, "/"))
        .await
        .expect("Fetch should succeed");

    assert_eq!(response.status_code, 200);
    assert_eq!(response.reason, "OK");
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("href=\"/a\""));
}

#[tokio::test]
async fn test_gateway_sends_identifying_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            format!("LinkSpector v{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .and(header("cache-control", "no-cache"))
        .respond_with(html(200, ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&CrawlOptions::default()).expect("Failed to create gateway");
    let response = gateway.fetch(&page_url(&mock_server, "/")).await.unwrap();

    // Without the headers no mock matches and wiremock answers 404
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_gateway_reports_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(html(404, "<p>missing</p>"))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&CrawlOptions::default()).unwrap();
    let response = gateway.fetch(&page_url(&mock_server, "/gone")).await.unwrap();

    assert_eq!(response.status_code, 404);
    assert_eq!(response.reason, "Not Found");
}

#[tokio::test]
async fn test_gateway_does_not_read_non_html_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 http://example.test/".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&CrawlOptions::default()).unwrap();
    let response = gateway
        .fetch(&page_url(&mock_server, "/report.pdf"))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/pdf");
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_gateway_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(200, "late").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let options = CrawlOptions {
        timeout_seconds: 1,
        ..CrawlOptions::default()
    };
    let gateway = HttpGateway::new(&options).unwrap();
    let outcome = gateway.fetch(&page_url(&mock_server, "/slow")).await;

    assert!(
        matches!(outcome, Err(FetchError::Timeout { .. })),
        "expected timeout, got {:?}",
        outcome
    );
}

#[tokio::test]
async fn test_gateway_connection_refused() {
    // Bind an ephemeral port, then release it so nothing listens there
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

    let gateway = HttpGateway::new(&CrawlOptions::default()).unwrap();
    let outcome = gateway.fetch(&url).await;

    assert!(
        matches!(outcome, Err(FetchError::Connect { .. })),
        "expected connection failure, got {:?}",
        outcome
    );
}

#[tokio::test]
async fn test_gateway_records_final_address_after_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/new"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(200, "<p>moved</p>"))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&CrawlOptions::default()).unwrap();
    let response = gateway.fetch(&page_url(&mock_server, "/old")).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.final_url, page_url(&mock_server, "/new"));
}

#[tokio::test]
async fn test_full_recursive_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            200,
            format!(
                r#"<html><body>
                <a href="{}/page1">Page 1</a>
                <a href="/page2">Page 2</a>
                <a href="/report.pdf">Report</a>
                <a href="mailto:someone@example.test">Mail</a>
                </body></html>"#,
                base_url
            ),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            200,
            r#"<a href="/">Home</a><a href="/page2">Page 2</a><a href="deep">Deep</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(404, "<p>gone</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deep"))
        .respond_with(html(200, "<p>no links</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let results = crawl(&format!("{}/", base_url), &recursive_config())
        .await
        .expect("Crawl should start");

    let checked: Vec<String> = results.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(checked, vec!["/", "/deep", "/page1", "/page2", "/report.pdf"]);

    let page2 = results.iter().find(|r| r.url.path() == "/page2").unwrap();
    assert_eq!(page2.status_code, 404);
    assert_eq!(page2.status_text, "Not Found");

    let summary = summarize(&results);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.ok, 4);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.failures, 0);
    // Mock expectations verify that every page was fetched exactly once
}

#[tokio::test]
async fn test_links_in_comments_are_not_checked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            200,
            r#"<a href="/visible">ok</a><!-- <a href="/hidden">old</a> -->"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/visible"))
        .respond_with(html(200, ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html(200, ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let results = crawl(&format!("{}/", mock_server.uri()), &recursive_config())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_non_recursive_crawl_checks_one_hop() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(200, r#"<a href="/one">one</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html(200, r#"<a href="/two">two</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(html(200, ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config::default();
    let results = crawl(&format!("{}/", mock_server.uri()), &config)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_root_only_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(200, r#"<a href="/one">one</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html(200, ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawl.non_recursive_scope = NonRecursiveScope::RootOnly;
    let results = crawl(&format!("{}/", mock_server.uri()), &config)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, 200);
}

#[tokio::test]
async fn test_timeout_during_crawl_is_an_exception() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(200, r#"<a href="/slow">slow</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(200, "").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = recursive_config();
    config.crawl.timeout_seconds = 1;
    let results = crawl(&format!("{}/", mock_server.uri()), &config)
        .await
        .unwrap();

    let slow = results.iter().find(|r| r.url.path() == "/slow").unwrap();
    assert_eq!(slow.status_code, -100);
    assert!(!slow.is_quirky);
    assert_eq!(summarize(&results).failures, 1);
}

#[tokio::test]
async fn test_stopped_crawl_records_exceptions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(200, ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let root = page_url(&mock_server, "/");
    let coordinator = Coordinator::new(root, CrawlOptions::default()).unwrap();
    coordinator.gateway().stop();

    let results = coordinator.run().await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, -100);
}

#[tokio::test]
async fn test_invalid_root_is_rejected() {
    let config = Config::default();
    assert!(crawl("not a url", &config).await.is_err());
    assert!(crawl("ftp://example.test/", &config).await.is_err());
}

#[tokio::test]
async fn test_redirect_to_other_host_is_not_scanned() {
    let root_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    // Same loopback interface, different host name
    let other_url = format!("http://localhost:{}", other_server.address().port());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(200, r#"<a href="/go">Go</a>"#))
        .mount(&root_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/landing", other_url).as_str()),
        )
        .expect(1)
        .mount(&root_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/only-on-other"))
        .respond_with(html(200, ""))
        .expect(0)
        .mount(&root_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html(200, r#"<a href="/only-on-other">Elsewhere</a>"#))
        .expect(1)
        .mount(&other_server)
        .await;

    let results = crawl(&format!("{}/", root_server.uri()), &recursive_config())
        .await
        .unwrap();

    let checked: Vec<&str> = results.iter().map(|r| r.url.path()).collect();
    assert_eq!(checked, vec!["/", "/go"]);
    assert!(results.iter().all(|r| r.status_code == 200));
}
