use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Which write endpoint a request counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateScope {
    Generation,
    PaymentCompletion,
}

/// Per-IP-per-scope fixed-window limiter for the write endpoints.
pub struct IpRateLimiter {
    /// (scope, ip) -> (count, window_start)
    entries: DashMap<(RateScope, IpAddr), (u32, Instant)>,
}

impl IpRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if request is allowed. Returns Ok(()) or Err with retry-after seconds.
    /// A limit of zero disables the check.
    pub fn check(&self, scope: RateScope, ip: IpAddr, limit: u32, window_secs: u64) -> Result<(), u64> {
        if limit == 0 {
            return Ok(());
        }

        let window = Duration::from_secs(window_secs);
        let now = Instant::now();

        let mut entry = self.entries.entry((scope, ip)).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(window_secs.saturating_sub(elapsed));
        }

        *count += 1;
        Ok(())
    }

    /// Remove stale entries older than the given duration.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for IpRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
