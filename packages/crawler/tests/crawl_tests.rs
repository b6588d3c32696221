//! End-to-end crawl tests against a mock catalog.
//!
//! The crawler uses a blocking client, so every crawl runs on a blocking
//! thread while the mock server is driven by the multi-threaded runtime.

use std::fs;
use std::path::Path;
use std::time::Duration;

use doclens_crawler::{CrawlReport, Crawler, CrawlerConfig, SkipReason, StopReason};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server_uri: &str, tmp: &TempDir) -> CrawlerConfig {
    CrawlerConfig::default()
        .with_listing_url_template(format!("{server_uri}/dataset/?q=pdf&page={{page}}"))
        .with_content_dir(tmp.path().join("raw"))
        .with_audit_log(tmp.path().join("crawl_log.csv"))
        .with_delays(Duration::ZERO, Duration::ZERO)
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
}

fn anchors(hrefs: &[&str]) -> String {
    let links: Vec<String> = hrefs
        .iter()
        .map(|h| format!(r#"<li><a href="{h}">{h}</a></li>"#))
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", links.join(""))
}

async fn mount_listing(server: &MockServer, page: &str, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/dataset/"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(anchors(hrefs)))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(anchors(hrefs)))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn run_crawl(config: CrawlerConfig, max_files: usize, max_pages: u32) -> CrawlReport {
    tokio::task::spawn_blocking(move || {
        let crawler = Crawler::new(config).unwrap();
        crawler.crawl(max_files, max_pages).unwrap()
    })
    .await
    .unwrap()
}

fn audit_rows(path: &Path) -> Vec<csv::StringRecord> {
    if !path.exists() {
        return Vec::new();
    }
    csv::Reader::from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap())
        .collect()
}

fn stored_files(tmp: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(tmp.path().join("raw"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crawl_downloads_allowed_files_and_audits() {
    let server = MockServer::start().await;
    let tmp = tempdir().unwrap();

    mount_listing(&server, "1", &["/dataset/budget"]).await;
    mount_listing(&server, "2", &[]).await;
    mount_page(
        &server,
        "/dataset/budget",
        &["/files/report.pdf", "/files/notes.txt", "/files/data.csv", "/files/memo.docx"],
    )
    .await;
    mount_file(&server, "/files/report.pdf", "%PDF-1.4 report").await;
    mount_file(&server, "/files/notes.txt", "plain notes").await;
    mount_file(&server, "/files/memo.docx", "PK docx").await;

    let report = run_crawl(config(&server.uri(), &tmp), 10, 5).await;

    assert_eq!(
        report.downloaded,
        vec!["report.pdf".to_string(), "notes.txt".to_string(), "memo.docx".to_string()]
    );
    assert_eq!(report.stop_reason, StopReason::EmptyListing { page: 2 });
    assert_eq!(stored_files(&tmp), vec!["memo.docx", "notes.txt", "report.pdf"]);

    let rows = audit_rows(&tmp.path().join("crawl_log.csv"));
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "report.pdf");
    assert_eq!(rows[0][1], format!("{}/files/report.pdf", server.uri()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crawl_never_exceeds_max_files() {
    let server = MockServer::start().await;
    let tmp = tempdir().unwrap();

    mount_listing(&server, "1", &["/dataset/a", "/dataset/b"]).await;
    mount_page(&server, "/dataset/a", &["/f/1.pdf", "/f/2.pdf"]).await;
    mount_page(&server, "/dataset/b", &["/f/3.pdf"]).await;
    for route in ["/f/1.pdf", "/f/2.pdf", "/f/3.pdf"] {
        mount_file(&server, route, "%PDF").await;
    }

    // Page 2 and dataset b must never be requested once the limit is hit.
    Mock::given(method("GET"))
        .and(path("/dataset/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(anchors(&["/dataset/c"])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dataset/b"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;

    let report = run_crawl(config(&server.uri(), &tmp), 2, 5).await;

    assert_eq!(report.downloaded.len(), 2);
    assert_eq!(report.stop_reason, StopReason::MaxFilesReached);
    assert_eq!(stored_files(&tmp).len(), 2);
    assert_eq!(audit_rows(&tmp.path().join("crawl_log.csv")).len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_forbidden_download_succeeds_on_referer_retry() {
    let server = MockServer::start().await;
    let tmp = tempdir().unwrap();
    let dataset_url = format!("{}/dataset/contracts", server.uri());

    mount_listing(&server, "1", &["/dataset/contracts"]).await;
    mount_page(&server, "/dataset/contracts", &["/files/contract.pdf"]).await;

    Mock::given(method("GET"))
        .and(path("/files/contract.pdf"))
        .and(header("Referer", dataset_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("%PDF-1.7"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/contract.pdf"))
        .respond_with(ResponseTemplate::new(403))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let report = run_crawl(config(&server.uri(), &tmp), 10, 1).await;

    assert_eq!(report.downloaded, vec!["contract.pdf".to_string()]);
    let rows = audit_rows(&tmp.path().join("crawl_log.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "contract.pdf");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_forbidden_twice_is_skipped_without_audit() {
    let server = MockServer::start().await;
    let tmp = tempdir().unwrap();

    mount_listing(&server, "1", &["/dataset/locked"]).await;
    mount_page(&server, "/dataset/locked", &["/files/secret.pdf", "/files/open.txt"]).await;
    Mock::given(method("GET"))
        .and(path("/files/secret.pdf"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;
    mount_file(&server, "/files/open.txt", "open").await;

    let report = run_crawl(config(&server.uri(), &tmp), 10, 1).await;

    assert_eq!(report.downloaded, vec!["open.txt".to_string()]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::ForbiddenRetryExhausted);
    assert_eq!(stored_files(&tmp), vec!["open.txt"]);
    assert_eq!(audit_rows(&tmp.path().join("crawl_log.csv")).len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_existing_file_is_not_downloaded_again() {
    let server = MockServer::start().await;
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("raw")).unwrap();
    fs::write(tmp.path().join("raw").join("report.pdf"), "already here").unwrap();

    mount_listing(&server, "1", &["/dataset/q1"]).await;
    mount_page(&server, "/dataset/q1", &["/files/report.pdf", "/files/invoice.pdf"]).await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new"))
        .expect(0)
        .mount(&server)
        .await;
    mount_file(&server, "/files/invoice.pdf", "%PDF invoice").await;

    let report = run_crawl(config(&server.uri(), &tmp), 10, 1).await;

    assert_eq!(report.downloaded, vec!["invoice.pdf".to_string()]);
    assert_eq!(
        fs::read_to_string(tmp.path().join("raw").join("report.pdf")).unwrap(),
        "already here"
    );
    let rows = audit_rows(&tmp.path().join("crawl_log.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "invoice.pdf");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_second_crawl_adds_nothing() {
    let server = MockServer::start().await;
    let tmp = tempdir().unwrap();

    mount_listing(&server, "1", &["/dataset/a"]).await;
    mount_page(&server, "/dataset/a", &["/f/a.pdf", "/f/b.txt"]).await;
    mount_file(&server, "/f/a.pdf", "%PDF").await;
    mount_file(&server, "/f/b.txt", "b").await;

    let first = run_crawl(config(&server.uri(), &tmp), 10, 1).await;
    let second = run_crawl(config(&server.uri(), &tmp), 10, 1).await;

    assert_eq!(first.downloaded.len(), 2);
    assert!(second.downloaded.is_empty());
    assert_eq!(audit_rows(&tmp.path().join("crawl_log.csv")).len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_catalog_yields_empty_report() {
    let tmp = tempdir().unwrap();
    let config = config("http://127.0.0.1:1", &tmp)
        .with_timeouts(Duration::from_millis(500), Duration::from_millis(500));

    let report = run_crawl(config, 5, 2).await;

    assert!(report.downloaded.is_empty());
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.stop_reason, StopReason::PagesExhausted);
    assert!(!tmp.path().join("crawl_log.csv").exists());
}
