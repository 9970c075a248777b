//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the crawl
//! limits end-to-end through the engine.

use crate::support::{mount_docs_site, page, seed_url, serve, test_config, BILLING_SECTION};
use doc_taxonomy::output::StopReason;
use doc_taxonomy::{Engine, PageState};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_page_limit_of_one() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let mut config = test_config();
    config.crawler.max_pages_per_site = 1;
    let engine = Engine::new(config).unwrap();

    let result = engine
        .extract_site(&engine.site(seed_url(&server)), CancellationToken::new())
        .await;

    assert_eq!(result.stats.pages_visited, 1);
    assert!(!result.stats.truncated);
    assert_eq!(result.stats.stop_reason, StopReason::PageLimit);
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        page("Start", r#"<p>Start here.</p><a href="/level1">Next</a>"#),
    )
    .await;
    serve(
        &server,
        "/level1",
        page("Level 1", r#"<p>Keep going.</p><a href="/level2">Next</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("Level 2", ""), "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.max_depth = 1;
    let engine = Engine::new(config).unwrap();

    let result = engine
        .extract_site(&engine.site(seed_url(&server)), CancellationToken::new())
        .await;

    assert_eq!(result.stats.pages_visited, 2);
    assert_eq!(result.stats.stop_reason, StopReason::Completed);
}

#[tokio::test]
async fn test_dead_links_recorded_not_fatal() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        page(
            "Start",
            r#"<a href="/missing">Gone</a> <a href="/billing">Billing</a>"#,
        ),
    )
    .await;
    serve(&server, "/billing", page("Billing", BILLING_SECTION)).await;

    let engine = Engine::new(test_config()).unwrap();
    let result = engine
        .extract_site(&engine.site(seed_url(&server)), CancellationToken::new())
        .await;

    assert_eq!(result.stats.pages_visited, 2);
    assert_eq!(result.stats.pages_skipped, 1);
    assert_eq!(result.stats.errors.len(), 1);
    assert_eq!(result.stats.errors[0].state, PageState::DeadLink);
    assert!(result.stats.errors[0].url.ends_with("/missing"));
    assert!(result.module("Billing").is_some());
}

#[tokio::test]
async fn test_non_html_pages_skipped() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        page("Start", r#"<a href="/manual.pdf">Manual</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/manual.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x25, 0x50, 0x44, 0x46], "application/pdf"))
        .mount(&server)
        .await;

    let engine = Engine::new(test_config()).unwrap();
    let result = engine
        .extract_site(&engine.site(seed_url(&server)), CancellationToken::new())
        .await;

    assert_eq!(result.stats.pages_visited, 1);
    assert_eq!(result.stats.errors[0].state, PageState::ContentMismatch);
}

#[tokio::test]
async fn test_unreachable_seed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let engine = Engine::new(test_config()).unwrap();
    let result = engine
        .extract_site(&engine.site(seed_url(&server)), CancellationToken::new())
        .await;

    assert!(result.modules.is_empty());
    assert_eq!(result.stats.stop_reason, StopReason::SeedUnreachable);
    assert_eq!(result.stats.errors[0].state, PageState::Failed);
}

#[tokio::test]
async fn test_site_budget_truncates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Slow", BILLING_SECTION), "text/html")
                .set_delay(Duration::from_millis(2_000)),
        )
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.site_budget_ms = 200;
    let engine = Engine::new(config).unwrap();

    let result = engine
        .extract_site(&engine.site(seed_url(&server)), CancellationToken::new())
        .await;

    assert_eq!(result.stats.stop_reason, StopReason::TimeBudget);
    assert!(result.stats.truncated);
    assert_eq!(result.stats.pages_visited, 0);
    assert!(result.stats.elapsed_ms < 2_000);
}

#[tokio::test]
async fn test_cancel_stops_all_sites() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Slow", BILLING_SECTION), "text/html")
                .set_delay(Duration::from_millis(2_000)),
        )
        .mount(&server)
        .await;

    let engine = Engine::new(test_config()).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let sites = vec![engine.site(seed_url(&server)), engine.site(seed_url(&server))];
    let results = engine.extract_all(sites, &cancel).await;

    for result in &results {
        assert_eq!(result.stats.stop_reason, StopReason::Cancelled);
        assert!(result.stats.truncated);
    }
}

#[tokio::test]
async fn test_cancelling_one_site_leaves_others_running() {
    let docs = MockServer::start().await;
    mount_docs_site(&docs).await;
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Slow", BILLING_SECTION), "text/html")
                .set_delay(Duration::from_millis(2_000)),
        )
        .mount(&slow)
        .await;

    let engine = Engine::new(test_config()).unwrap();
    let slow_cancel = CancellationToken::new();
    let trigger = slow_cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let docs_site = engine.site(seed_url(&docs));
    let slow_site = engine.site(seed_url(&slow));
    let (docs_result, slow_result) = tokio::join!(
        engine.extract_site(&docs_site, CancellationToken::new()),
        engine.extract_site(&slow_site, slow_cancel),
    );

    assert_eq!(slow_result.stats.stop_reason, StopReason::Cancelled);
    assert!(slow_result.stats.truncated);

    assert_eq!(docs_result.stats.stop_reason, StopReason::Completed);
    assert!(!docs_result.stats.truncated);
    assert_eq!(docs_result.stats.pages_visited, 4);
    assert!(docs_result.module("Account Settings").is_some());
}

#[tokio::test]
async fn test_dead_links_do_not_spend_page_budget() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        page(
            "Start",
            r#"<a href="/missing1">Gone</a> <a href="/missing2">Gone too</a>
            <a href="/a">A</a> <a href="/b">B</a>"#,
        ),
    )
    .await;
    serve(&server, "/a", page("A", BILLING_SECTION)).await;
    serve(&server, "/b", page("B", BILLING_SECTION)).await;

    let mut config = test_config();
    config.crawler.max_pages_per_site = 3;
    let engine = Engine::new(config).unwrap();
    let result = engine
        .extract_site(&engine.site(seed_url(&server)), CancellationToken::new())
        .await;

    assert_eq!(result.stats.pages_visited, 3);
    assert_eq!(result.stats.pages_skipped, 2);
    assert_eq!(result.stats.stop_reason, StopReason::Completed);
    assert_eq!(result.module("Billing").unwrap().sources.len(), 2);
}
