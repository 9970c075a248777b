/// Page state definitions for reporting crawl outcomes
///
/// This module defines every state a page can end up in during a site crawl.
use serde::Serialize;
use std::fmt;

/// Represents the final state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    // ===== Success States =====
    /// Page was fetched, cleaned and handed to the extractor
    Processed,

    /// Page was fetched but its markup could not be segmented
    Malformed,

    // ===== Error States =====
    /// Page returned HTTP 404/410
    DeadLink,

    /// Page could not be reached (timeout, connection refused, DNS failure)
    Unreachable,

    /// Page returned HTTP 429
    RateLimited,

    /// Page fetch failed for other reasons (5xx, unreadable body, etc.)
    Failed,

    /// Page Content-Type is not HTML
    ContentMismatch,

    // ===== Special States =====
    /// Page was dropped because too many of its siblings failed in a row
    BranchAbandoned,
}

impl PageState {
    /// Returns true if the page was fetched and counts as visited content
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::Malformed)
    }

    /// Returns true if the page was requested and the request failed
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink
                | Self::Unreachable
                | Self::RateLimited
                | Self::Failed
                | Self::ContentMismatch
        )
    }

    /// Returns the stable string form used in results and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Malformed => "malformed",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::RateLimited => "rate_limited",
            Self::Failed => "failed",
            Self::ContentMismatch => "content_mismatch",
            Self::BranchAbandoned => "branch_abandoned",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
