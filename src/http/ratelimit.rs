//! Per-bucket and global rate-limit tracking.
//!
//! Discord assigns each route an opaque bucket id via `x-ratelimit-bucket`.
//! Routes are first seen by their [`Route::bucket_key`](super::Route::bucket_key)
//! and mapped to a bucket once a response reveals it.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::trace;

/// Rate-limit metadata extracted from REST response headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitInfo {
    pub remaining: Option<u32>,
    pub limit: Option<u32>,
    /// Epoch seconds when the bucket resets.
    pub reset_at: Option<f64>,
    /// Seconds until the bucket resets.
    pub reset_after: Option<f64>,
    pub bucket: Option<String>,
    pub is_global: bool,
    /// `x-ratelimit-scope`: `user`, `global` or `shared`.
    pub scope: Option<String>,
}

impl RateLimitInfo {
    /// Time until the bucket resets, from `reset-after` or else the
    /// absolute `reset` timestamp.
    pub fn reset_delay(&self) -> Option<Duration> {
        if let Some(after) = self.reset_after {
            return Some(secs(after));
        }
        let reset_at = self.reset_at?;
        let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        Some(secs(reset_at - now))
    }
}

/// Body of a 429 response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RateLimitedBody {
    #[serde(default)]
    pub retry_after: Option<f64>,
    #[serde(default)]
    pub global: bool,
}

#[derive(Debug, Clone)]
struct BucketState {
    remaining: u32,
    resets_at: Instant,
}

#[derive(Debug, Default)]
pub(crate) struct RateLimiter {
    /// Route key → bucket id mapping.
    route_buckets: HashMap<String, String>,
    /// Bucket id → state.
    buckets: HashMap<String, BucketState>,
    /// No request may be sent before this instant.
    global_until: Option<Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long to wait before sending on `route_key`, or `None` to send now.
    pub fn delay_for(&self, route_key: &str) -> Option<Duration> {
        let now = Instant::now();
        if let Some(until) = self.global_until {
            if until > now {
                return Some(until - now);
            }
        }

        let bucket_id = self.route_buckets.get(route_key)?;
        let state = self.buckets.get(bucket_id)?;

        if state.remaining == 0 && state.resets_at > now {
            return Some(state.resets_at - now);
        }

        None
    }

    /// Record the headers of a response on `route_key`.
    pub fn update(&mut self, route_key: &str, info: &RateLimitInfo) {
        if info.is_global {
            if let Some(delay) = info.reset_delay() {
                self.lock_global(delay);
            }
        }

        if let Some(ref bucket) = info.bucket {
            self.route_buckets
                .insert(route_key.to_string(), bucket.clone());

            let delay = info.reset_delay().unwrap_or(Duration::from_secs(1));
            trace!(
                route = route_key,
                bucket = %bucket,
                remaining = ?info.remaining,
                limit = ?info.limit,
                reset_in_ms = delay.as_millis() as u64,
                "rate-limit bucket updated"
            );
            let resets_at = Instant::now() + delay;

            self.buckets.insert(
                bucket.clone(),
                BucketState {
                    remaining: info.remaining.unwrap_or(1),
                    resets_at,
                },
            );
        }
    }

    /// Block every route for `delay`.
    pub fn lock_global(&mut self, delay: Duration) {
        let until = Instant::now() + delay;
        if self.global_until.map_or(true, |current| current < until) {
            self.global_until = Some(until);
        }
    }

    pub fn bucket_of(&self, route_key: &str) -> Option<&str> {
        self.route_buckets.get(route_key).map(String::as_str)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::ZERO)
}

// ---------------------------------------------------------------------------
// Parse rate-limit headers
// ---------------------------------------------------------------------------

pub(crate) fn parse_rate_limit_headers(headers: &HeaderMap) -> RateLimitInfo {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    RateLimitInfo {
        remaining: header("x-ratelimit-remaining").and_then(|s| s.parse().ok()),
        limit: header("x-ratelimit-limit").and_then(|s| s.parse().ok()),
        reset_at: header("x-ratelimit-reset").and_then(|s| s.parse().ok()),
        reset_after: header("x-ratelimit-reset-after").and_then(|s| s.parse().ok()),
        bucket: header("x-ratelimit-bucket").map(str::to_string),
        is_global: header("x-ratelimit-global") == Some("true"),
        scope: header("x-ratelimit-scope").map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn info(bucket: &str, remaining: u32, reset_after: f64) -> RateLimitInfo {
        RateLimitInfo {
            remaining: Some(remaining),
            reset_after: Some(reset_after),
            bucket: Some(bucket.to_string()),
            ..RateLimitInfo::default()
        }
    }

    #[test]
    fn unknown_route_sends_immediately() {
        assert!(RateLimiter::new().delay_for("GET /users/@me").is_none());
    }

    #[test]
    fn exhausted_bucket_delays() {
        let mut limiter = RateLimiter::new();
        limiter.update("POST /channels/{channel_id}/messages 1", &info("abc", 0, 5.0));
        let delay = limiter
            .delay_for("POST /channels/{channel_id}/messages 1")
            .unwrap();
        assert!(delay > Duration::from_secs(4));
        assert_eq!(
            limiter.bucket_of("POST /channels/{channel_id}/messages 1"),
            Some("abc")
        );
    }

    #[test]
    fn remaining_requests_do_not_delay() {
        let mut limiter = RateLimiter::new();
        limiter.update("GET /x", &info("abc", 3, 5.0));
        assert!(limiter.delay_for("GET /x").is_none());
    }

    #[test]
    fn routes_sharing_a_bucket_share_state() {
        let mut limiter = RateLimiter::new();
        limiter.update("GET /a", &info("shared", 2, 5.0));
        limiter.update("GET /b", &info("shared", 0, 5.0));
        assert!(limiter.delay_for("GET /a").is_some());
    }

    #[test]
    fn global_lock_applies_everywhere() {
        let mut limiter = RateLimiter::new();
        limiter.lock_global(Duration::from_secs(3));
        assert!(limiter.delay_for("GET /anything").is_some());
    }

    #[test]
    fn parses_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4"));
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("5"));
        headers.insert("x-ratelimit-reset-after", HeaderValue::from_static("1.5"));
        headers.insert("x-ratelimit-bucket", HeaderValue::from_static("d721dea6054f6322"));
        headers.insert("x-ratelimit-global", HeaderValue::from_static("true"));
        let info = parse_rate_limit_headers(&headers);
        assert_eq!(info.remaining, Some(4));
        assert_eq!(info.limit, Some(5));
        assert_eq!(info.reset_after, Some(1.5));
        assert_eq!(info.bucket.as_deref(), Some("d721dea6054f6322"));
        assert!(info.is_global);
        assert!(info.scope.is_none());
    }

    #[test]
    fn absolute_reset_is_used_without_reset_after() {
        let reset_at = chrono::Utc::now().timestamp() as f64 + 10.0;
        let info = RateLimitInfo {
            remaining: Some(0),
            limit: Some(5),
            reset_at: Some(reset_at),
            bucket: Some("abc".to_string()),
            scope: Some("user".to_string()),
            ..RateLimitInfo::default()
        };
        let mut limiter = RateLimiter::new();
        limiter.update("GET /x", &info);
        let delay = limiter.delay_for("GET /x").unwrap();
        assert!(delay > Duration::from_secs(5));
    }

    #[test]
    fn reset_after_wins_over_absolute_reset() {
        let info = RateLimitInfo {
            reset_at: Some(chrono::Utc::now().timestamp() as f64 + 100.0),
            reset_after: Some(2.0),
            ..RateLimitInfo::default()
        };
        assert_eq!(info.reset_delay(), Some(Duration::from_secs(2)));
        assert_eq!(RateLimitInfo::default().reset_delay(), None);
    }

    #[test]
    fn parses_scope_and_absolute_reset() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1470173023.123"));
        headers.insert("x-ratelimit-scope", HeaderValue::from_static("shared"));
        let info = parse_rate_limit_headers(&headers);
        assert_eq!(info.reset_at, Some(1470173023.123));
        assert_eq!(info.scope.as_deref(), Some("shared"));
        assert!(!info.is_global);
    }
}
