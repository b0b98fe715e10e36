//! Per-identifier token-bucket rate limiter.
//!
//! Buckets refill lazily on access rather than on a background timer, so a
//! long-idle identifier replenishes fully on its next check. The limiter is
//! an explicit object injected into handler state, not a process global.
//!
//! Under concurrent checks for the same identifier the count is an
//! approximation: two requests can both observe the last token. Accepted
//! for a per-instance limiter guarding burst abuse, not billing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default requests allowed per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 20;
/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);
/// Entries idle for this many windows are swept during `check`.
const STALE_WINDOWS: u32 = 5;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

struct Inner {
    buckets: HashMap<String, Bucket>,
    last_sweep: Instant,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Tokens left after this call. Zero when denied.
    pub remaining: u32,
}

/// Token-bucket limiter keyed by opaque identifier strings
/// (e.g. `"generate:{user_id}"`).
pub struct RateLimiter {
    inner: Mutex<Inner>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                buckets: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            max_requests,
            window,
        }
    }

    /// Window length, for `Retry-After` headers.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and consume one token for `identifier`.
    pub fn check(&self, identifier: &str) -> RateLimitDecision {
        self.check_at(identifier, Instant::now())
    }

    /// Clock-injectable variant of [`check`](Self::check).
    pub fn check_at(&self, identifier: &str, now: Instant) -> RateLimitDecision {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        self.sweep_stale(&mut inner, now);

        let Some(bucket) = inner.buckets.get_mut(identifier) else {
            // First sighting: the current call consumes one token.
            inner.buckets.insert(
                identifier.to_string(),
                Bucket {
                    tokens: self.max_requests - 1,
                    last_refill: now,
                },
            );
            return RateLimitDecision {
                allowed: true,
                remaining: self.max_requests - 1,
            };
        };

        // Lazy refill proportional to elapsed time, capped at capacity.
        let elapsed = now.duration_since(bucket.last_refill);
        let refill = (elapsed.as_millis() as u64 * self.max_requests as u64
            / self.window.as_millis().max(1) as u64) as u32;
        if refill > 0 {
            bucket.tokens = bucket.tokens.saturating_add(refill).min(self.max_requests);
            bucket.last_refill = now;
        }

        if bucket.tokens == 0 {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
            };
        }

        bucket.tokens -= 1;
        RateLimitDecision {
            allowed: true,
            remaining: bucket.tokens,
        }
    }

    /// Drop buckets idle longer than `STALE_WINDOWS` windows. Runs at most
    /// once per window to keep `check` cheap.
    fn sweep_stale(&self, inner: &mut Inner, now: Instant) {
        if now.duration_since(inner.last_sweep) < self.window {
            return;
        }
        let stale_after = self.window * STALE_WINDOWS;
        inner
            .buckets
            .retain(|_, b| now.duration_since(b.last_refill) <= stale_after);
        inner.last_sweep = now;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_identifier_starts_one_below_capacity() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let decision = limiter.check("user:1");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }

    #[test]
    fn burst_up_to_capacity_then_denied() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("user:1", now).allowed);
        }
        let denied = limiter.check_at("user:1", now);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[test]
    fn denied_check_does_not_decrement() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        limiter.check_at("user:1", now);
        limiter.check_at("user:1", now);
        // Several denied checks, then a partial refill restores exactly one.
        limiter.check_at("user:1", now);
        limiter.check_at("user:1", now);
        let later = now + Duration::from_secs(30);
        assert!(limiter.check_at("user:1", later).allowed);
        assert!(!limiter.check_at("user:1", later).allowed);
    }

    #[test]
    fn full_window_idle_replenishes_to_capacity() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..3 {
            limiter.check_at("user:1", now);
        }
        assert!(!limiter.check_at("user:1", now).allowed);

        let after_window = now + Duration::from_secs(60);
        let decision = limiter.check_at("user:1", after_window);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[test]
    fn identifiers_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("user:1", now).allowed);
        assert!(!limiter.check_at("user:1", now).allowed);
        assert!(limiter.check_at("user:2", now).allowed);
    }

    #[test]
    fn stale_buckets_are_swept() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        let now = Instant::now();
        limiter.check_at("old", now);
        // Six windows later the old bucket is past the stale horizon and a
        // new check for it behaves like a first sighting.
        let later = now + Duration::from_secs(6);
        limiter.check_at("fresh", later);
        {
            let inner = limiter.inner.lock().unwrap();
            assert!(!inner.buckets.contains_key("old"));
        }
        let decision = limiter.check_at("old", later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }
}
