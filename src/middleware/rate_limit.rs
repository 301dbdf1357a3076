//! Rate limiting middleware.
//!
//! In-memory fixed-window rate limiting per authenticated caller. Runs after
//! the auth gate, so the key is the verified user id from the token claims.

use crate::auth::middleware::extract_claims;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for rate limiting.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
    /// Burst allowance (extra requests above limit before hard reject).
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            burst: 0,
        }
    }
}

/// Rate limiter state tracking requests per caller.
#[derive(Clone)]
pub struct RateLimitLayer {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    BurstUsed { remaining: u32 },
    Exceeded { retry_after: Duration },
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count one request against `user_id` and decide whether it may proceed.
    pub fn check(&self, user_id: &str) -> RateLimitResult {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: &str, now: Instant) -> RateLimitResult {
        // Lookup, reset and increment all happen under one lock
        let mut state = self.state.lock();

        let entry = state.entry(user_id.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);

        let limit = self.config.max_requests.saturating_add(self.config.burst);
        let remaining = limit.saturating_sub(entry.count);
        let reset_at = entry.window_start + self.config.window;

        if entry.count > limit {
            RateLimitResult::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else if entry.count > self.config.max_requests {
            RateLimitResult::BurstUsed { remaining }
        } else {
            RateLimitResult::Allowed { remaining }
        }
    }

    /// Periodic cleanup of old entries (call from a background task).
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    fn cleanup_at(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        let window = self.config.window;
        let before = state.len();

        state.retain(|_, entry| now.duration_since(entry.window_start) < window * 2);

        before - state.len()
    }

    #[cfg(test)]
    pub(crate) fn tracked_callers(&self) -> usize {
        self.state.lock().len()
    }
}

/// Rate limiting middleware function.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitLayer>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Mounted inside the auth gate, so claims are always present on note routes
    let Some(user_id) = extract_claims(&request).map(|claims| claims.user_id.clone()) else {
        return Ok(next.run(request).await);
    };

    match limiter.check(&user_id) {
        RateLimitResult::Allowed { .. } => Ok(next.run(request).await),
        RateLimitResult::BurstUsed { remaining } => {
            debug!(user_id = %user_id, remaining, "Burst allowance in use");
            Ok(next.run(request).await)
        }
        RateLimitResult::Exceeded { retry_after } => {
            warn!(
                user_id = %user_id,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(ApiError::TooManyRequests { retry_after })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_allows_under_limit() {
        let config = RateLimitConfig {
            max_requests: 10,
            window: Duration::from_secs(60),
            burst: 5,
        };
        let limiter = RateLimitLayer::new(config);

        for _ in 0..10 {
            match limiter.check("u1") {
                RateLimitResult::Allowed { .. } => {}
                other => panic!("Should be allowed, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_rate_limit_allows_burst() {
        let config = RateLimitConfig {
            max_requests: 5,
            window: Duration::from_secs(60),
            burst: 3,
        };
        let limiter = RateLimitLayer::new(config);

        for _ in 0..5 {
            assert!(matches!(
                limiter.check("u1"),
                RateLimitResult::Allowed { .. }
            ));
        }
        for _ in 0..3 {
            assert!(matches!(
                limiter.check("u1"),
                RateLimitResult::BurstUsed { .. }
            ));
        }
        assert!(matches!(
            limiter.check("u1"),
            RateLimitResult::Exceeded { .. }
        ));
    }

    #[test]
    fn test_callers_have_separate_buckets() {
        let limiter = RateLimitLayer::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
            burst: 0,
        });

        assert!(matches!(limiter.check("a"), RateLimitResult::Allowed { .. }));
        assert!(matches!(limiter.check("a"), RateLimitResult::Exceeded { .. }));
        assert!(matches!(limiter.check("b"), RateLimitResult::Allowed { .. }));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimitLayer::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(10),
            burst: 0,
        });
        let start = Instant::now();

        assert!(matches!(
            limiter.check_at("a", start),
            RateLimitResult::Allowed { .. }
        ));
        match limiter.check_at("a", start + Duration::from_secs(4)) {
            RateLimitResult::Exceeded { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(6))
            }
            other => panic!("Should be exceeded, got {:?}", other),
        }
        assert!(matches!(
            limiter.check_at("a", start + Duration::from_secs(10)),
            RateLimitResult::Allowed { .. }
        ));
    }

    #[test]
    fn test_cleanup_drops_stale_buckets() {
        let limiter = RateLimitLayer::new(RateLimitConfig {
            max_requests: 5,
            window: Duration::from_secs(10),
            burst: 0,
        });
        let start = Instant::now();
        limiter.check_at("old", start);
        limiter.check_at("new", start + Duration::from_secs(15));

        assert_eq!(limiter.cleanup_at(start + Duration::from_secs(21)), 1);
        assert_eq!(limiter.tracked_callers(), 1);
    }

    #[test]
    fn test_concurrent_checks_never_undercount() {
        let limiter = RateLimitLayer::new(RateLimitConfig {
            max_requests: 20,
            window: Duration::from_secs(60),
            burst: 5,
        });

        let passed: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let limiter = limiter.clone();
                    scope.spawn(move || {
                        (0..10)
                            .filter(|_| {
                                !matches!(limiter.check("u1"), RateLimitResult::Exceeded { .. })
                            })
                            .count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        // 80 requests raced for 20 + 5 slots
        assert_eq!(passed, 25);
        assert!(matches!(
            limiter.check("u1"),
            RateLimitResult::Exceeded { .. }
        ));
    }
}
