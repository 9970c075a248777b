use crate::config::ExtractorConfig;
use crate::text::words;
use std::collections::HashSet;

/// Heading-level signal: top-level headings are stronger evidence of a module
pub fn heading_signal(level: u8) -> f64 {
    match level {
        1 => 1.0,
        2 => 0.85,
        _ => 0.6,
    }
}

/// Raw extraction score in [0, 1]
///
/// `heading_weight * heading_signal + length_weight * min(len / saturation, 1)
///  + keyword_weight * min(keyword_hits / saturation, 1)`
pub fn raw_score(config: &ExtractorConfig, level: u8, heading: &str, body: &str) -> f64 {
    let length_signal = saturate(body.chars().count(), config.length_saturation);
    let keyword_signal = saturate(
        keyword_hits(&config.keywords, heading, body),
        config.keyword_saturation,
    );

    let score = config.heading_weight * heading_signal(level)
        + config.length_weight * length_signal
        + config.keyword_weight * keyword_signal;

    score.clamp(0.0, 1.0)
}

/// Number of distinct configured keywords found in the heading or body
pub fn keyword_hits(keywords: &[String], heading: &str, body: &str) -> usize {
    let text = format!("{} {}", heading, body);
    let present: HashSet<String> = words(&text).into_iter().collect();
    let lowered = text.to_lowercase();

    keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|keyword| {
            if keyword.contains(' ') {
                lowered.contains(keyword.as_str())
            } else {
                present.contains(keyword)
            }
        })
        .count()
}

fn saturate(value: usize, saturation: usize) -> f64 {
    if saturation == 0 {
        return 1.0;
    }
    (value as f64 / saturation as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_signal_ordering() {
        assert!(heading_signal(1) > heading_signal(2));
        assert!(heading_signal(2) > heading_signal(3));
    }

    #[test]
    fn test_keyword_hits_distinct() {
        let keywords = vec!["settings".to_string(), "api".to_string(), "billing".to_string()];
        assert_eq!(
            keyword_hits(&keywords, "Account Settings", "Settings and more settings via the API."),
            2
        );
    }

    #[test]
    fn test_keyword_hits_whole_words_only() {
        let keywords = vec!["api".to_string()];
        assert_eq!(keyword_hits(&keywords, "Capital", "rapid"), 0);
    }

    #[test]
    fn test_raw_score_saturates_at_one() {
        let config = ExtractorConfig {
            keywords: vec!["settings".to_string()],
            keyword_saturation: 1,
            length_saturation: 10,
            ..ExtractorConfig::default()
        };
        let score = raw_score(&config, 1, "Settings", &"x".repeat(50));
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_raw_score_weights() {
        let config = ExtractorConfig {
            keywords: Vec::new(),
            length_saturation: 100,
            ..ExtractorConfig::default()
        };
        let score = raw_score(&config, 2, "Plain", &"x".repeat(50));
        let expected = 0.4 * 0.85 + 0.3 * 0.5;
        assert!((score - expected).abs() < 1e-9);
    }
}
