use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tracks the state of a single host during crawling
///
/// This structure maintains the per-host information needed to space out
/// requests according to the politeness delay.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests issued to this host in the current crawl
    pub request_count: u32,

    /// Start time reserved for the most recent request to this host
    pub last_request_time: Option<Instant>,
}

impl HostState {
    /// Creates a new HostState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next request slot and returns when it starts
    ///
    /// Slots are handed out in call order, so concurrent callers queue up
    /// behind each other instead of all firing once the delay elapses.
    pub fn reserve(&mut self, delay: Duration, now: Instant) -> Instant {
        let start = match self.last_request_time {
            Some(last) if last + delay > now => last + delay,
            _ => now,
        };
        self.request_count += 1;
        self.last_request_time = Some(start);
        start
    }
}

/// Shared per-host politeness table
///
/// Fetches for one site run concurrently; each one reserves a start slot
/// here before touching the network. The lock is only held while computing
/// the slot, never across the sleep.
#[derive(Debug)]
pub struct HostThrottle {
    delay: Duration,
    hosts: Mutex<HashMap<String, HostState>>,
}

impl HostThrottle {
    /// Creates a throttle enforcing `delay` between request starts per host
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until the given host may receive another request
    pub async fn acquire(&self, host: &str) {
        if self.delay.is_zero() {
            return;
        }

        let start = {
            let mut hosts = self
                .hosts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            hosts
                .entry(host.to_string())
                .or_insert_with(HostState::new)
                .reserve(self.delay, Instant::now())
        };

        tokio::time::sleep_until(tokio::time::Instant::from_std(start)).await;
    }

    /// Returns the number of requests reserved for a host
    pub fn request_count(&self, host: &str) -> u32 {
        self.hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(host)
            .map(|state| state.request_count)
            .unwrap_or(0)
    }
}
