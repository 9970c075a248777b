//! Doc-Taxonomy: a documentation module extraction engine
//!
//! This crate crawls documentation websites and derives a hierarchy of
//! modules and submodules, each with a merged description and a confidence
//! score, from the headings and text of the crawled pages.

pub mod cleaner;
pub mod config;
pub mod crawler;
pub mod describe;
pub mod engine;
pub mod extractor;
pub mod merger;
pub mod output;
pub mod state;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Doc-Taxonomy operations
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Per-page fetch failures; recorded against the page, never fatal to a crawl
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// Maps the failure onto the page state it leaves the page in
    pub fn state(&self) -> state::PageState {
        use state::PageState;

        match self {
            Self::Timeout { .. } => PageState::Unreachable,
            Self::Status { status: 404, .. } | Self::Status { status: 410, .. } => {
                PageState::DeadLink
            }
            Self::Status { status: 429, .. } => PageState::RateLimited,
            Self::Status { .. } => PageState::Failed,
            Self::Network { .. } => PageState::Unreachable,
            Self::ContentMismatch { .. } => PageState::ContentMismatch,
            Self::Body { .. } => PageState::Failed,
        }
    }
}

/// Markup that could not be turned into segments
#[derive(Debug, Clone, Error)]
pub enum CleaningError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Document contains binary content")]
    BinaryContent,

    #[error("Document has no content root")]
    NoContentRoot,
}

/// Failures of the optional description capability
#[derive(Debug, Clone, Error)]
pub enum DescribeError {
    #[error("Description capability unavailable: {0}")]
    Unavailable(String),

    #[error("Description request timed out")]
    Timeout,
}

/// Result type alias for Doc-Taxonomy operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Engine, Site};
pub use output::{ExtractionResult, Module};
pub use state::PageState;
pub use url::{extract_domain, normalize_url};
