use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::ApiError;
use crate::logging::{log_security_event, RequestMeta};
use crate::state::AppState;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client identity.
///
/// One mutex guards the whole map, so concurrent requests at a window
/// boundary converge on a single reset. Counters are ephemeral; a restart
/// clears them, which is acceptable for a throttle.
pub struct RateLimiter {
    window: Duration,
    max_attempts: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(window_ms: u64, max_attempts: u32) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            max_attempts,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one attempt for `key`; `false` means over the limit for the
    /// remainder of the window.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) > self.window {
            window.started = now;
            window.count = 0;
        }

        window.count = window.count.saturating_add(1);
        window.count <= self.max_attempts
    }
}

/// Guards the register/login endpoints only; resource routes are not rate
/// limited.
pub async fn auth_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let meta = RequestMeta::from_request(&request);

    if !state.limiter.check(&meta.client_ip) {
        log_security_event(
            "rate_limit_exceeded",
            "Excessive authentication attempts",
            &meta,
        );
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_max_attempts() {
        let limiter = RateLimiter::new(60_000, 5);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("1.2.3.4", now));
        }
        assert!(!limiter.check_at("1.2.3.4", now));
    }

    #[test]
    fn test_window_reset_allows_again() {
        let limiter = RateLimiter::new(1_000, 2);
        let start = Instant::now();
        assert!(limiter.check_at("k", start));
        assert!(limiter.check_at("k", start));
        assert!(!limiter.check_at("k", start));

        let later = start + Duration::from_millis(1_001);
        assert!(limiter.check_at("k", later));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(60_000, 1);
        let now = Instant::now();
        assert!(limiter.check_at("a", now));
        assert!(!limiter.check_at("a", now));
        assert!(limiter.check_at("b", now));
    }
}
