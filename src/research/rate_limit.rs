//! Fixed-window trigger rate limiting.
//!
//! Bounds how often research runs may be started per key (per article or per
//! user, at the caller's discretion). State is an in-memory timestamp list
//! per key; each check prunes stamps older than the window. Keys are never
//! evicted, which is acceptable for bounded key cardinality.

use crate::types::{AppError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(10 * 60);
const MAX_RUNS: usize = 5;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the trigger may proceed.
    pub allowed: bool,
    /// On denial, time until the oldest recorded start leaves the window.
    pub retry_after: Duration,
}

/// Fixed-window limiter: at most 5 starts per key per 10 minutes.
pub struct ResearchRateLimiter {
    window: Duration,
    max_runs: usize,
    buckets: Mutex<HashMap<String, Vec<Instant>>>,
}

impl Default for ResearchRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchRateLimiter {
    /// Create a limiter with the production window (10 minutes, 5 starts).
    pub fn new() -> Self {
        Self::with_limits(WINDOW, MAX_RUNS)
    }

    /// Create a limiter with custom limits (used by tests).
    pub fn with_limits(window: Duration, max_runs: usize) -> Self {
        Self {
            window,
            max_runs,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Check and record one trigger attempt for `key`.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let mut buckets = self.buckets.lock();
        let stamps = buckets.entry(key.to_string()).or_default();

        stamps.retain(|stamp| now.duration_since(*stamp) < self.window);

        if stamps.len() >= self.max_runs {
            // Stamps are appended in order, so the first is the oldest.
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(stamps[0]));
            return RateDecision {
                allowed: false,
                retry_after,
            };
        }

        stamps.push(now);
        RateDecision {
            allowed: true,
            retry_after: Duration::ZERO,
        }
    }

    /// Like [`check`](Self::check), but maps a denial to
    /// [`AppError::RateLimited`] for callers surfacing a retry-after.
    pub fn enforce(&self, key: &str) -> Result<()> {
        let decision = self.check(key);
        if decision.allowed {
            Ok(())
        } else {
            Err(AppError::RateLimited(
                decision.retry_after.as_millis() as u64
            ))
        }
    }
}
