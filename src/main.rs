//! Doc-Taxonomy main entry point
//!
//! This is the command-line interface for the Doc-Taxonomy module extractor.

use anyhow::{Context, Result};
use clap::Parser;
use doc_taxonomy::config::{load_config_with_hash, validate, Config};
use doc_taxonomy::output::print_statistics;
use doc_taxonomy::Engine;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Doc-Taxonomy: documentation module extractor
///
/// Crawls documentation sites from the given seed URLs and prints, for each
/// site, the modules and submodules found in its pages as JSON.
#[derive(Parser, Debug)]
#[command(name = "doc-taxonomy")]
#[command(version)]
#[command(about = "Extracts a module hierarchy from documentation sites", long_about = None)]
struct Cli {
    /// Seed URLs, one result per URL
    #[arg(value_name = "URL", required = true)]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from each seed
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of pages fetched per site
    #[arg(long)]
    max_pages: Option<u32>,

    /// Drop modules scoring below this confidence
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Name similarity at or above which two modules may be merged
    #[arg(long)]
    similarity_threshold: Option<f64>,

    /// Use the configured summarizer endpoint for descriptions
    #[arg(long)]
    ai: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the effective configuration and exit without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        return handle_dry_run(&config, &cli.seeds);
    }

    handle_extract(config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doc_taxonomy=info,warn"),
            1 => EnvFilter::new("doc_taxonomy=debug,info"),
            2 => EnvFilter::new("doc_taxonomy=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages_per_site = max_pages;
    }
    if let Some(min_confidence) = cli.min_confidence {
        config.merger.min_confidence = min_confidence;
    }
    if let Some(similarity_threshold) = cli.similarity_threshold {
        config.merger.similarity_threshold = similarity_threshold;
    }
    if cli.ai {
        config.extractor.enable_ai_descriptions = true;
    }
}

/// Handles the --dry-run mode: shows the effective configuration and seeds
fn handle_dry_run(config: &Config, seeds: &[String]) -> Result<()> {
    println!("=== Doc-Taxonomy Dry Run ===\n");

    let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
    println!("{}", rendered);

    println!("Seeds ({}):", seeds.len());
    for seed in seeds {
        match doc_taxonomy::normalize_url(seed) {
            Ok(url) => println!("  - {}", url),
            Err(e) => println!("  - {} (invalid: {})", seed, e),
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main extraction run
async fn handle_extract(config: Config, cli: &Cli) -> Result<()> {
    let engine = Engine::new(config).context("failed to start the extraction engine")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with partial results");
            on_signal.cancel();
        }
    });

    let sites = cli.seeds.iter().map(|seed| engine.site(seed.as_str())).collect();
    let results = engine.extract_all(sites, &cancel).await;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&results)
    } else {
        serde_json::to_string(&results)
    }
    .context("failed to serialize results")?;
    println!("{}", json);

    if !cli.quiet {
        print_statistics(&results);
    }

    Ok(())
}
