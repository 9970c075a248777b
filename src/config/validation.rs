use crate::config::types::{
    CleanerConfig, ConfidenceConfig, Config, CrawlerConfig, ExtractorConfig, MergerConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Tolerance when checking that the score weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validates the entire configuration
///
/// Called by the loaders and by `Engine::new`, so a bad configuration is
/// rejected before any crawl starts.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_cleaner_config(&config.cleaner)?;
    validate_extractor_config(&config.extractor)?;
    validate_merger_config(&config.merger)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages_per_site < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages_per_site must be >= 1, got {}",
            config.max_pages_per_site
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.site_budget_ms == 0 {
        return Err(ConfigError::Validation(
            "site_budget_ms must be > 0".to_string(),
        ));
    }

    if config.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max_consecutive_failures must be >= 1, got {}",
            config.max_consecutive_failures
        )));
    }

    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates cleaner configuration
fn validate_cleaner_config(config: &CleanerConfig) -> Result<(), ConfigError> {
    if !config.heading_density_threshold.is_finite() || config.heading_density_threshold < 0.0 {
        return Err(ConfigError::Validation(format!(
            "heading_density_threshold must be a non-negative number, got {}",
            config.heading_density_threshold
        )));
    }

    for selector in &config.ignore_selectors {
        Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    }

    Ok(())
}

/// Validates extractor configuration
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    let weights = [
        ("heading_weight", config.heading_weight),
        ("length_weight", config.length_weight),
        ("keyword_weight", config.keyword_weight),
    ];

    for (name, weight) in weights {
        validate_unit_interval(name, weight)?;
    }

    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::Validation(format!(
            "heading_weight + length_weight + keyword_weight must sum to 1.0, got {}",
            sum
        )));
    }

    if config.length_saturation == 0 || config.keyword_saturation == 0 {
        return Err(ConfigError::Validation(
            "length_saturation and keyword_saturation must be >= 1".to_string(),
        ));
    }

    if config.describe_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "describe_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.description_sentences == 0 {
        return Err(ConfigError::Validation(
            "description_sentences must be >= 1".to_string(),
        ));
    }

    if config.max_excerpt_chars < 20 {
        return Err(ConfigError::Validation(format!(
            "max_excerpt_chars must be >= 20, got {}",
            config.max_excerpt_chars
        )));
    }

    match (&config.summarizer_endpoint, config.enable_ai_descriptions) {
        (Some(endpoint), _) => {
            Url::parse(endpoint).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid summarizer_endpoint: {}", e))
            })?;
        }
        (None, true) => {
            return Err(ConfigError::Validation(
                "enable_ai_descriptions requires summarizer_endpoint".to_string(),
            ));
        }
        (None, false) => {}
    }

    Ok(())
}

/// Validates merger configuration
fn validate_merger_config(config: &MergerConfig) -> Result<(), ConfigError> {
    if !(config.similarity_threshold > 0.0 && config.similarity_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "similarity_threshold must be in (0, 1], got {}",
            config.similarity_threshold
        )));
    }

    validate_unit_interval("min_confidence", config.min_confidence)?;

    if config.max_description_chars < 20 {
        return Err(ConfigError::Validation(format!(
            "max_description_chars must be >= 20, got {}",
            config.max_description_chars
        )));
    }

    validate_confidence_config(&config.confidence)
}

/// Validates the confidence formula constants
fn validate_confidence_config(config: &ConfidenceConfig) -> Result<(), ConfigError> {
    validate_unit_interval("confidence.base", config.base)?;
    validate_unit_interval("confidence.avg_score_weight", config.avg_score_weight)?;
    validate_unit_interval(
        "confidence.corroboration_weight",
        config.corroboration_weight,
    )?;
    validate_unit_interval("confidence.degraded_penalty", config.degraded_penalty)?;

    if config.corroboration_cap < 1 {
        return Err(ConfigError::Validation(
            "confidence.corroboration_cap must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be between 0.0 and 1.0, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
