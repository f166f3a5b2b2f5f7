//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_harvest::config::CrawlConfig;
use site_harvest::crawler::{Crawler, DiskCache};
use site_harvest::report::{Report, CRAWL_STEP};
use site_harvest::{CrawlOutcome, HarvestError};
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::Dispatch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration without rate limiting
fn create_test_config(start_url: &str, output: &Path) -> CrawlConfig {
    let mut config = CrawlConfig::new(start_url, output);
    config.delay_ms = 0;
    config.max_concurrency = 4;
    config.user_agent = "TestBot/1.0".to_string();
    config
}

/// A logger that writes into the test harness's captured output
fn test_logger() -> Dispatch {
    Dispatch::new(
        tracing_subscriber::fmt()
            .with_env_filter("site_harvest=debug")
            .with_test_writer()
            .finish(),
    )
}

async fn run(config: CrawlConfig) -> CrawlOutcome {
    Crawler::new(config, test_logger())
        .expect("Failed to create crawler")
        .run(CancellationToken::new())
        .await
        .expect("Crawl failed")
}

/// Mounts an HTML page that must be fetched exactly `times` times
async fn mount_page(server: &MockServer, page: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn saved_urls(outcome: &CrawlOutcome) -> HashSet<String> {
    outcome.saved.iter().map(|page| page.url.clone()).collect()
}

fn url_set(base: &str, paths: &[&str]) -> HashSet<String> {
    paths.iter().map(|p| format!("{}{}", base, p)).collect()
}

#[tokio::test]
async fn test_linear_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/a">A</a> <a href="/b">B</a>"#, 1).await;
    mount_page(
        &server,
        "/a",
        r#"<a href="/b">B</a> <a href="https://other.com/x">Elsewhere</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/b", "<p>leaf</p>", 1).await;

    let output = TempDir::new().unwrap();
    let outcome = run(create_test_config(&base, output.path())).await;

    assert_eq!(saved_urls(&outcome), url_set(&base, &["/", "/a", "/b"]));
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    assert!(outcome
        .saved
        .iter()
        .all(|page| !page.url.contains("other.com")));
    assert!(!outcome.errors.keys().any(|url| url.contains("other.com")));

    // Files land under <output>/<host>_<port>/
    let port = url::Url::parse(&base).unwrap().port().unwrap();
    let site_dir = output.path().join(format!("127.0.0.1_{}", port));
    assert_eq!(
        std::fs::read_to_string(site_dir.join("b.html")).unwrap(),
        "<p>leaf</p>"
    );
    assert!(site_dir.join("index.html").is_file());
    assert!(site_dir.join("a.html").is_file());

    let paths: HashSet<_> = outcome.saved_paths().map(|p| p.to_path_buf()).collect();
    assert!(paths.contains(&site_dir.join("a.html")));

    server.verify().await;
}

#[tokio::test]
async fn test_shared_page_fetched_once() {
    for concurrency in [1, 3, 8] {
        let server = MockServer::start().await;

        mount_page(
            &server,
            "/",
            r#"<a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a>"#,
            1,
        )
        .await;
        for page in ["/p1", "/p2", "/p3"] {
            mount_page(&server, page, r#"<a href="/common">Common</a>"#, 1).await;
        }
        mount_page(&server, "/common", r#"<a href="/">Home</a>"#, 1).await;

        let output = TempDir::new().unwrap();
        let mut config = create_test_config(&server.uri(), output.path());
        config.max_concurrency = concurrency;

        let outcome = run(config).await;

        assert_eq!(outcome.saved_count(), 5, "concurrency {}", concurrency);
        assert!(outcome.errors.is_empty());
        server.verify().await;
    }
}

#[tokio::test]
async fn test_cache_bypasses_network() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", "<html><body>cached home</body></html>", 1).await;

    let cache = TempDir::new().unwrap();
    let first_output = TempDir::new().unwrap();
    let second_output = TempDir::new().unwrap();

    let mut config = create_test_config(&base, first_output.path());
    config.cache_dir = Some(cache.path().to_path_buf());
    let first = run(config.clone()).await;

    config.output_dir = second_output.path().to_path_buf();
    let second = run(config).await;

    // Exactly one network request across both runs
    server.verify().await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    let seed = format!("{}/", base);
    assert!(cache.path().join(DiskCache::key(&seed)).is_file());

    let first_bytes = std::fs::read(&first.saved[0].path).unwrap();
    let second_bytes = std::fs::read(&second.saved[0].path).unwrap();
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(second_bytes, b"<html><body>cached home</body></html>");
}

#[tokio::test]
async fn test_page_budget_bounds_submitted_jobs() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>leaf</p>"))
        .mount(&server)
        .await;

    let budget = 3;
    let concurrency = 2;
    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), output.path());
    config.max_pages = budget;
    config.max_concurrency = concurrency;

    let outcome = run(config).await;

    let requests = server.received_requests().await.unwrap().len();
    assert!(
        requests <= budget + concurrency,
        "{} requests for a budget of {}",
        requests,
        budget
    );
    assert!(outcome.processed() >= budget);
    assert!(outcome.processed() <= budget + concurrency);
}

#[tokio::test]
async fn test_retry_mode_skips_discovery() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", "<p>seed</p>", 0).await;
    mount_page(
        &server,
        "/broken",
        r#"<a href="/a">A</a><a href="/b">B</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/a", "<p>a</p>", 0).await;
    mount_page(&server, "/b", "<p>b</p>", 0).await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&base, output.path());
    config.retry_urls = vec![
        format!("{}/broken", base),
        format!("{}/broken/", base),
        "not a url".to_string(),
    ];

    let outcome = run(config).await;

    assert_eq!(saved_urls(&outcome), url_set(&base, &["/broken"]));
    assert!(outcome.errors.is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_retry_from_previous_report() {
    let server = MockServer::start().await;
    let base = server.uri();

    // First run: /flaky fails
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/flaky">Flaky</a>"#, 1).await;

    let output = TempDir::new().unwrap();
    let first = run(create_test_config(&base, output.path())).await;
    assert_eq!(
        first.errors.keys().cloned().collect::<HashSet<_>>(),
        url_set(&base, &["/flaky"])
    );

    let mut report = Report::new();
    report.add_step(CRAWL_STEP).record_crawl(&first);

    // Second run: /flaky recovers
    mount_page(&server, "/flaky", r#"<a href="/">Home</a>"#, 1).await;

    let mut config = create_test_config(&base, output.path());
    config.retry_urls = report.failed_urls(CRAWL_STEP);
    let second = run(config).await;

    assert_eq!(saved_urls(&second), url_set(&base, &["/flaky"]));
    assert!(second.errors.is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;
    mount_page(&server, "/a", "<p>a</p>", 1).await;
    mount_page(&server, "/b", "<p>b</p>", 1).await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), output.path());
    config.delay_ms = 200;
    config.max_concurrency = 3;

    let started = Instant::now();
    let outcome = run(config).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome.saved_count(), 3);
    assert!(
        elapsed >= Duration::from_millis(400),
        "three requests took only {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_cancelled_crawl_terminates_with_errors() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>never fetched</p>", 0).await;

    let output = TempDir::new().unwrap();
    let base = server.uri();
    let crawler = Crawler::new(create_test_config(&base, output.path()), test_logger()).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = crawler.run(cancel).await.expect("cancellation is not fatal");

    assert!(outcome.saved.is_empty());
    let seed = format!("{}/", base);
    assert!(outcome.errors[&seed].contains("rate limiter"));
    server.verify().await;
}

#[tokio::test]
async fn test_http_errors_recorded_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/boom">Boom</a><a href="/ok">Ok</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/boom"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "<p>ok</p>", 1).await;

    let output = TempDir::new().unwrap();
    let outcome = run(create_test_config(&base, output.path())).await;

    assert_eq!(saved_urls(&outcome), url_set(&base, &["/", "/ok"]));
    assert_eq!(
        outcome.errors.keys().cloned().collect::<HashSet<_>>(),
        url_set(&base, &["/missing", "/boom"])
    );
    assert!(outcome.errors[&format!("{}/missing", base)].starts_with("http 404"));
    assert!(outcome.errors[&format!("{}/boom", base)].starts_with("http 500"));
}

#[tokio::test]
async fn test_save_failure_recorded_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;
    mount_page(&server, "/a", r#"<a href="/c">C</a>"#, 1).await;
    mount_page(&server, "/b", "<p>b</p>", 1).await;
    mount_page(&server, "/c", "<p>c</p>", 1).await;

    // A directory where /a would be written makes that save fail
    let output = TempDir::new().unwrap();
    let port = url::Url::parse(&base).unwrap().port().unwrap();
    let blocked = output
        .path()
        .join(format!("127.0.0.1_{}", port))
        .join("a.html");
    std::fs::create_dir_all(&blocked).unwrap();

    let outcome = run(create_test_config(&base, output.path())).await;

    assert_eq!(saved_urls(&outcome), url_set(&base, &["/", "/b", "/c"]));
    assert_eq!(
        outcome.errors.keys().cloned().collect::<HashSet<_>>(),
        url_set(&base, &["/a"])
    );
    let message = &outcome.errors[&format!("{}/a", base)];
    assert!(message.contains("a.html"), "{}", message);
    server.verify().await;
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/docs/"))
        .mount(&server)
        .await;
    mount_page(&server, "/docs/", r#"<a href="intro">Intro</a>"#, 1).await;
    mount_page(&server, "/docs/intro", "<p>intro</p>", 1).await;
    mount_page(&server, "/intro", "<p>wrong base</p>", 0).await;

    let output = TempDir::new().unwrap();
    let outcome = run(create_test_config(&base, output.path())).await;

    assert_eq!(saved_urls(&outcome), url_set(&base, &["/", "/docs/intro"]));
    server.verify().await;
}

#[tokio::test]
async fn test_scope_limited_to_seed_path() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs",
        r#"<a href="/docs/a">A</a><a href="/blog/x">Blog</a><a href="/docsx">Lookalike</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/docs/a", r#"<a href="/">Home</a>"#, 1).await;
    mount_page(&server, "/blog/x", "", 0).await;
    mount_page(&server, "/docsx", "", 0).await;
    mount_page(&server, "/", "", 0).await;

    let output = TempDir::new().unwrap();
    let outcome = run(create_test_config(&format!("{}/docs/", base), output.path())).await;

    assert_eq!(saved_urls(&outcome), url_set(&base, &["/docs", "/docs/a"]));
    server.verify().await;
}

#[tokio::test]
async fn test_unparseable_page_still_saved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0x00, 0xfe, b'<', 0x80]))
        .expect(1)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let outcome = run(create_test_config(&server.uri(), output.path())).await;

    assert_eq!(outcome.saved_count(), 1);
    assert!(outcome.errors.is_empty());
    assert_eq!(
        std::fs::read(&outcome.saved[0].path).unwrap(),
        vec![0xff, 0x00, 0xfe, b'<', 0x80]
    );
    server.verify().await;
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let output = TempDir::new().unwrap();
    let crawler = Crawler::new(
        create_test_config("/relative", output.path()),
        test_logger(),
    )
    .unwrap();

    let err = crawler.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, HarvestError::InvalidSeed { .. }));
}

#[tokio::test]
async fn test_independent_crawlers_in_one_process() {
    let first_server = MockServer::start().await;
    let second_server = MockServer::start().await;
    mount_page(&first_server, "/", "<p>one</p>", 1).await;
    mount_page(&second_server, "/", "<p>two</p>", 1).await;

    let first_output = TempDir::new().unwrap();
    let second_output = TempDir::new().unwrap();
    let first = Crawler::new(
        create_test_config(&first_server.uri(), first_output.path()),
        test_logger(),
    )
    .unwrap();
    let second = Crawler::new(
        create_test_config(&second_server.uri(), second_output.path()),
        Dispatch::new(tracing::subscriber::NoSubscriber::default()),
    )
    .unwrap();

    let (a, b) = tokio::join!(
        first.run(CancellationToken::new()),
        second.run(CancellationToken::new())
    );

    assert_eq!(a.unwrap().saved_count(), 1);
    assert_eq!(b.unwrap().saved_count(), 1);
    first_server.verify().await;
    second_server.verify().await;
}
