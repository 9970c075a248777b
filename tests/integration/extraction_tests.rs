//! Integration tests for module extraction
//!
//! Each test serves a small documentation site with wiremock and runs the
//! whole pipeline against it: crawl, clean, extract, merge and assemble.

use crate::support::{mount_docs_site, page, seed_url, serve, test_config, ACCOUNT_SECTION};
use async_trait::async_trait;
use doc_taxonomy::config::{load_config_with_hash, Config};
use doc_taxonomy::crawler::HttpFetcher;
use doc_taxonomy::describe::{Describer, SentenceDescriber};
use doc_taxonomy::output::{ExtractionResult, StopReason};
use doc_taxonomy::{DescribeError, Engine};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A describer that is never available
struct Offline;

#[async_trait]
impl Describer for Offline {
    async fn summarize(&self, _heading: &str, _body: &str) -> Result<String, DescribeError> {
        Err(DescribeError::Unavailable("summarizer offline".to_string()))
    }
}

fn engine_with(config: Config, describer: Arc<dyn Describer>) -> Engine {
    let fetcher = Arc::new(HttpFetcher::new(&config.user_agent).unwrap());
    Engine::with_parts(config, fetcher, describer).unwrap()
}

async fn run(engine: &Engine, seed: String) -> ExtractionResult {
    engine
        .extract_site(&engine.site(seed), CancellationToken::new())
        .await
}

#[tokio::test]
async fn test_module_found_on_two_pages_is_merged() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let mut config = test_config();
    config.merger.min_confidence = 0.0;
    let engine = Engine::new(config).unwrap();
    let result = run(&engine, seed_url(&server)).await;

    assert_eq!(result.stats.pages_visited, 4);
    assert_eq!(result.stats.stop_reason, StopReason::Completed);
    assert!(!result.stats.truncated);

    let account = result.module("Account Settings").expect("Account Settings module");
    let submodules: Vec<&str> = account.submodules.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(submodules, vec!["Change Username", "Privacy Settings"]);
    assert_eq!(
        account.sources,
        vec![
            format!("{}/account", server.uri()),
            format!("{}/profile", server.uri())
        ]
    );

    let names: Vec<&str> = result.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names.iter().filter(|n| **n == "Account Settings").count(),
        1,
        "modules: {:?}",
        names
    );

    let billing = result.module("Billing").expect("Billing module");
    assert_eq!(billing.sources.len(), 1);
    assert!(account.confidence_score > billing.confidence_score);
}

#[tokio::test]
async fn test_chrome_only_page_yields_no_modules() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        page(
            "Index",
            r#"<h2>Table of Contents</h2>
            <p>Getting started, installation, configuration, account settings, billing and a long
            list of every other chapter that this documentation site happens to contain.</p>
            <h2>On This Page</h2>
            <p>Overview, prerequisites, step by step instructions, troubleshooting tips and the
            frequently asked questions that readers of this page most often have.</p>"#,
        ),
    )
    .await;

    let engine = Engine::new(test_config()).unwrap();
    let result = run(&engine, seed_url(&server)).await;

    assert_eq!(result.stats.pages_visited, 1);
    assert!(result.modules.is_empty());
    assert_eq!(result.stats.modules_excluded, 0);
}

#[tokio::test]
async fn test_unavailable_describer_lowers_confidence() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let mut config = test_config();
    config.merger.min_confidence = 0.0;

    let described = engine_with(config.clone(), Arc::new(SentenceDescriber::new(3, 600)));
    let offline = engine_with(config, Arc::new(Offline));

    let with_describer = run(&described, seed_url(&server)).await;
    let without_describer = run(&offline, seed_url(&server)).await;

    assert_eq!(without_describer.stats.pages_visited, 4);
    assert_eq!(
        with_describer.modules.len(),
        without_describer.modules.len()
    );

    for module in &without_describer.modules {
        let reference = with_describer.module(&module.name).unwrap();
        assert!(
            module.confidence_score < reference.confidence_score,
            "{} scored {} without describer, {} with",
            module.name,
            module.confidence_score,
            reference.confidence_score
        );
        assert!(!module.description.is_empty());
    }

    let account = without_describer.module("Account Settings").unwrap();
    assert_eq!(account.submodules.len(), 2);
}

#[tokio::test]
async fn test_summarizer_endpoint_descriptions() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "description": "Summarized by the service."
        })))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.merger.min_confidence = 0.0;
    config.extractor.enable_ai_descriptions = true;
    config.extractor.summarizer_endpoint = Some(format!("{}/summarize", server.uri()));

    let engine = Engine::new(config).unwrap();
    let result = run(&engine, seed_url(&server)).await;

    let account = result.module("Account Settings").unwrap();
    assert_eq!(account.description, "Summarized by the service.");
    assert_eq!(
        account.submodule("Privacy Settings").unwrap().description,
        "Summarized by the service."
    );
}

#[tokio::test]
async fn test_repeated_runs_agree_on_module_names() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let engine = Engine::new(test_config()).unwrap();
    let first = run(&engine, seed_url(&server)).await;
    let second = run(&engine, seed_url(&server)).await;

    let names = |result: &ExtractionResult| -> Vec<String> {
        result.modules.iter().map(|m| m.name.clone()).collect()
    };
    assert!(!first.modules.is_empty());
    assert_eq!(names(&first), names(&second));
}

#[tokio::test]
async fn test_low_confidence_modules_counted() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let mut config = test_config();
    config.merger.min_confidence = 0.99;
    let engine = Engine::new(config).unwrap();
    let result = run(&engine, seed_url(&server)).await;

    assert!(result.modules.is_empty());
    assert!(result.stats.modules_excluded >= 3);
}

#[tokio::test]
async fn test_sites_run_independently() {
    let docs = MockServer::start().await;
    mount_docs_site(&docs).await;
    let other = MockServer::start().await;
    serve(&other, "/", page("Other", ACCOUNT_SECTION)).await;

    let engine = Engine::new(test_config()).unwrap();
    let sites = vec![
        engine.site(seed_url(&docs)),
        engine.site("mailto:someone@example.com"),
        engine.site(seed_url(&other)),
    ];
    let results = engine.extract_all(sites, &CancellationToken::new()).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].stats.pages_visited, 4);
    assert_eq!(results[1].stats.stop_reason, StopReason::InvalidSeed);
    assert_eq!(results[2].stats.pages_visited, 1);
    assert_eq!(
        results[2].module("Account Settings").unwrap().sources,
        vec![seed_url(&other)]
    );
}

#[tokio::test]
async fn test_config_file_drives_engine() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
max-depth = 0
politeness-delay-ms = 0

[user-agent]
crawler-name = "TestBot"

[merger]
min-confidence = 0.0
"#
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);

    let engine = Engine::new(config).unwrap();
    let result = run(&engine, seed_url(&server)).await;

    assert_eq!(result.stats.pages_visited, 1);
    assert_eq!(result.modules.len(), 1);
    assert_eq!(result.modules[0].name, "Product Documentation");
}

#[tokio::test]
async fn test_result_serializes_to_documented_shape() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let engine = Engine::new(test_config()).unwrap();
    let result = run(&engine, seed_url(&server)).await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["site_url"], seed_url(&server));
    let account = json["modules"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == "Account Settings")
        .unwrap();
    assert!(account["submodules"]["Change Username"].is_string());
    assert!(account["confidence_score"].is_f64());
    assert_eq!(json["stats"]["stop_reason"], "completed");
    assert_eq!(json["stats"]["truncated"], false);
    assert!(json["stats"]["elapsed_ms"].is_u64());
}
