//! State module for tracking crawl progress
//!
//! This module provides state management for pages and hosts during a site crawl.
//!
//! # Components
//!
//! - `PageState`: The outcome of each page (queued, processed, dead link, etc.)
//! - `HostState`: Per-host request bookkeeping used for politeness delays
//! - `HostThrottle`: Shared table of host states consulted by concurrent fetches

mod host_state;
mod page_state;

// Re-export main types
pub use host_state::{HostState, HostThrottle};
pub use page_state::PageState;
