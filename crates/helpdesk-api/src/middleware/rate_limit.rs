//! Fixed-window rate limiter, keyed per client address.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use tracing::debug;

use helpdesk_core::config::RateLimitConfig;
use helpdesk_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Windows are pruned once this many clients are tracked.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-memory per-client request counter.
///
/// Injected through [`AppState`] so tests get their own instance.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Window>>,
    max_requests: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_requests,
            window,
            enabled: true,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        let mut limiter = Self::new(config.max_requests, Duration::from_secs(config.window_seconds));
        limiter.enabled = config.enabled;
        limiter
    }

    /// Records one request for `key`; `false` once the window is exhausted.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// [`RateLimiter::check`] with an explicit clock.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }
        if self.windows.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            self.windows
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

/// Client key: first `X-Forwarded-For` hop, else the peer address.
pub fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rejects requests over the limit with `429`.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_key(&request);
    if !state.rate_limiter.check(&key) {
        debug!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        return ApiError(AppError::rate_limited(
            "Too many requests, please try again later",
        ))
        .into_response();
    }
    next.run(request).await
}
