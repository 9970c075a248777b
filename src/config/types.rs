use serde::{Deserialize, Serialize};

/// Main configuration structure for Doc-Taxonomy
///
/// Every section has defaults, so an empty TOML file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub cleaner: CleanerConfig,
    pub extractor: ExtractorConfig,
    pub merger: MergerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed URL (the seed is depth 0)
    pub max_depth: u32,

    /// Maximum number of pages fetched per site
    pub max_pages_per_site: u32,

    /// Maximum number of fetches in flight for one site
    pub max_concurrent_fetches: u32,

    /// Minimum time between request starts to the same host (milliseconds)
    pub politeness_delay_ms: u64,

    /// Per-request timeout (milliseconds)
    pub request_timeout_ms: u64,

    /// Wall-clock budget for one site's crawl (milliseconds)
    pub site_budget_ms: u64,

    /// Consecutive failures among one page's children before the rest are dropped
    pub max_consecutive_failures: u32,

    /// Extra hosts links may lead to, besides the seed's own (supports "*.example.com")
    pub allowed_domains: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages_per_site: 50,
            max_concurrent_fetches: 5,
            politeness_delay_ms: 100,
            request_timeout_ms: 30_000,
            site_budget_ms: 300_000,
            max_consecutive_failures: 3,
            allowed_domains: Vec::new(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "DocTaxonomy".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `Mozilla/5.0 (compatible; Name/Version; +ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "Mozilla/5.0 (compatible; {}/{}; +{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!(
                "Mozilla/5.0 (compatible; {}/{})",
                self.crawler_name, self.crawler_version
            ),
        }
    }
}

/// Content cleaner configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CleanerConfig {
    /// Minimum whitespace-normalized body length (characters) for a segment
    pub min_body_length: usize,

    /// Minimum text length per element for a heading to count as content
    pub heading_density_threshold: f64,

    /// Heading labels that mark navigation chrome (case-insensitive)
    pub chrome_headings: Vec<String>,

    /// CSS selectors whose subtrees are removed before segmentation
    pub ignore_selectors: Vec<String>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            min_body_length: 100,
            heading_density_threshold: 3.0,
            chrome_headings: [
                "Home",
                "Search",
                "Footer",
                "Header",
                "Navigation",
                "Menu",
                "Table of Contents",
                "Contents",
                "On This Page",
                "Breadcrumb",
                "Skip to Content",
                "Sign In",
                "Log In",
                "Previous",
                "Next",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ignore_selectors: [
                "nav",
                "header",
                "footer",
                "aside",
                ".sidebar",
                ".navigation",
                ".advertisement",
                ".breadcrumb",
                ".breadcrumbs",
                ".menu",
                ".toc",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Module candidate extraction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractorConfig {
    /// Use the configured summarizer endpoint for descriptions
    pub enable_ai_descriptions: bool,

    /// Endpoint receiving `{heading, body}` and answering `{description}`
    pub summarizer_endpoint: Option<String>,

    /// Timeout for one description request (milliseconds)
    pub describe_timeout_ms: u64,

    /// Weight of the heading-level signal in the raw score
    pub heading_weight: f64,

    /// Weight of the body-length signal in the raw score
    pub length_weight: f64,

    /// Weight of the keyword signal in the raw score
    pub keyword_weight: f64,

    /// Body length (characters) at which the length signal saturates
    pub length_saturation: usize,

    /// Distinct keyword hits at which the keyword signal saturates
    pub keyword_saturation: usize,

    /// Domain keywords that indicate a feature section
    pub keywords: Vec<String>,

    /// Number of sentences used by the deterministic describer
    pub description_sentences: usize,

    /// Maximum length of a fallback excerpt (characters)
    pub max_excerpt_chars: usize,

    /// Maximum number of submodules kept per module
    pub max_submodules_per_module: usize,

    /// Infer submodules from "includes A, B and C" style phrases
    pub infer_listed_submodules: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            enable_ai_descriptions: false,
            summarizer_endpoint: None,
            describe_timeout_ms: 10_000,
            heading_weight: 0.4,
            length_weight: 0.3,
            keyword_weight: 0.3,
            length_saturation: 800,
            keyword_saturation: 3,
            keywords: [
                "settings",
                "configure",
                "configuration",
                "troubleshoot",
                "troubleshooting",
                "api",
                "install",
                "installation",
                "setup",
                "account",
                "security",
                "authentication",
                "permissions",
                "integration",
                "integrations",
                "billing",
                "reports",
                "dashboard",
                "notifications",
                "users",
                "admin",
                "privacy",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            description_sentences: 3,
            max_excerpt_chars: 300,
            max_submodules_per_module: 10,
            infer_listed_submodules: true,
        }
    }
}

/// Module merging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MergerConfig {
    /// Name similarity at or above which two modules may be the same
    pub similarity_threshold: f64,

    /// Significant description terms two similar modules must share
    pub min_shared_keywords: usize,

    /// Upper bound on a merged description (characters)
    pub max_description_chars: usize,

    /// Modules below this confidence are dropped from the result
    pub min_confidence: f64,

    pub confidence: ConfidenceConfig,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            min_shared_keywords: 2,
            max_description_chars: 600,
            min_confidence: 0.3,
            confidence: ConfidenceConfig::default(),
        }
    }
}

/// Constants of the confidence formula
///
/// `confidence = clamp(base + avg_score_weight * avg_raw_score
///     + corroboration_weight * min(sources, corroboration_cap)
///     - degraded_penalty * degraded_fraction, 0, 1)`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfidenceConfig {
    pub base: f64,
    pub avg_score_weight: f64,
    pub corroboration_weight: f64,
    pub corroboration_cap: usize,
    pub degraded_penalty: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 0.0,
            avg_score_weight: 0.5,
            corroboration_weight: 0.1,
            corroboration_cap: 5,
            degraded_penalty: 0.1,
        }
    }
}
