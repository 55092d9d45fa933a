//! API Middleware (Rate Limiting, Logging)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::handlers::AppState;
use super::types::{ApiError, ApiResponse};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Estimate/options/stats calls allowed per client per window
    pub requests_per_window: u32,
    pub window_duration: Duration,
    /// Take the client address from `x-forwarded-for` / `x-real-ip`.
    /// Only safe behind a proxy that overwrites those headers.
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 120,
            window_duration: Duration::from_secs(60),
            trust_forwarded_headers: false,
        }
    }
}

/// Who a request is counted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKey {
    Ip(IpAddr),
    /// No socket address and no trusted header (in-process callers)
    Unidentified,
}

impl ClientKey {
    /// Resolve the key for a request.
    ///
    /// Forwarded headers are consulted only when `trust_forwarded` is set;
    /// otherwise a client could pick its own bucket.
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> Self {
        let forwarded = trust_forwarded
            .then(|| forwarded_ip(headers))
            .flatten();

        match forwarded.or(peer.map(|addr| addr.ip())) {
            Some(ip) => ClientKey::Ip(ip),
            None => ClientKey::Unidentified,
        }
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientKey::Ip(ip) => write!(f, "{}", ip),
            ClientKey::Unidentified => write!(f, "unidentified"),
        }
    }
}

/// First hop of `x-forwarded-for`, else `x-real-ip`
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };
    header_ip("x-forwarded-for").or_else(|| header_ip("x-real-ip"))
}

/// Outcome of one rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Calls left in the current window after this one
    pub remaining: u32,
    /// Seconds until the window resets
    pub reset_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

/// Fixed-window rate limiter, one window per client
pub struct RateLimiter {
    windows: DashMap<ClientKey, Window>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn check(&self, key: ClientKey) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Count one call from `key` at `now`.
    pub fn check_at(&self, key: ClientKey, now: Instant) -> RateDecision {
        let limit = self.config.requests_per_window;
        let window_len = self.config.window_duration;

        let mut window = self.windows.entry(key).or_insert(Window {
            started: now,
            used: 0,
        });
        if now.saturating_duration_since(window.started) >= window_len {
            *window = Window {
                started: now,
                used: 0,
            };
        }

        let reset_secs = window_len
            .saturating_sub(now.saturating_duration_since(window.started))
            .as_secs();

        if window.used >= limit {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_secs,
            };
        }

        window.used += 1;
        RateDecision {
            allowed: true,
            remaining: limit - window.used,
            reset_secs,
        }
    }

    /// Drop windows that have fully expired; returns how many were removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    pub fn cleanup_at(&self, now: Instant) -> usize {
        let window_len = self.config.window_duration;
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.saturating_duration_since(window.started) < window_len);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Periodically evict expired rate-limit windows
pub fn start_cleanup_task(limiter: Arc<RateLimiter>) {
    let period = limiter.config().window_duration;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = limiter.cleanup();
            if removed > 0 {
                debug!(removed, "Rate limiter cleanup");
            }
        }
    });
}

fn is_health_path(path: &str) -> bool {
    path == "/health" || path == "/v1/health"
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    if is_health_path(request.uri().path()) {
        return next.run(request).await;
    }

    let limiter = &state.rate_limiter;
    let key = ClientKey::resolve(
        request.headers(),
        connect_info.map(|ConnectInfo(addr)| addr),
        limiter.config().trust_forwarded_headers,
    );
    let decision = limiter.check(key);

    if !decision.allowed {
        warn!(client = %key, "Rate limit exceeded");
        let body = ApiResponse::error(ApiError::rate_limited(decision.reset_secs), 0.0);
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("x-ratelimit-remaining", decision.remaining.into());
    headers.insert("x-ratelimit-reset", decision.reset_secs.into());

    response
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter(limit: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            requests_per_window: limit,
            window_duration: Duration::from_secs(60),
            trust_forwarded_headers: false,
        })
    }

    fn ip(s: &str) -> ClientKey {
        ClientKey::Ip(s.parse().unwrap())
    }

    #[test]
    fn test_blocks_after_quota() {
        let limiter = limiter(2);
        let now = Instant::now();

        let first = limiter.check_at(ip("10.0.0.1"), now);
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let second = limiter.check_at(ip("10.0.0.1"), now);
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        assert!(!limiter.check_at(ip("10.0.0.1"), now).allowed);
        // Other clients keep their own window
        assert!(limiter.check_at(ip("10.0.0.2"), now).allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1);
        let now = Instant::now();

        assert!(limiter.check_at(ip("10.0.0.1"), now).allowed);
        assert!(!limiter.check_at(ip("10.0.0.1"), now + Duration::from_secs(59)).allowed);
        assert!(limiter.check_at(ip("10.0.0.1"), now + Duration::from_secs(60)).allowed);
    }

    #[test]
    fn test_cleanup_uses_window_length() {
        let limiter = limiter(5);
        let now = Instant::now();
        limiter.check_at(ip("10.0.0.1"), now);
        limiter.check_at(ip("10.0.0.2"), now + Duration::from_secs(30));

        assert_eq!(limiter.cleanup_at(now + Duration::from_secs(59)), 0);
        assert_eq!(limiter.cleanup_at(now + Duration::from_secs(60)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_key_ignores_headers_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("9.9.9.9, 10.0.0.1"));
        let peer: SocketAddr = "203.0.113.7:51000".parse().unwrap();

        assert_eq!(ClientKey::resolve(&headers, Some(peer), false), ip("203.0.113.7"));
        assert_eq!(ClientKey::resolve(&headers, Some(peer), true), ip("9.9.9.9"));
        assert_eq!(ClientKey::resolve(&HeaderMap::new(), None, true), ClientKey::Unidentified);
    }

    #[test]
    fn test_key_falls_back_to_real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        let peer: SocketAddr = "203.0.113.7:51000".parse().unwrap();
        assert_eq!(ClientKey::resolve(&headers, Some(peer), true), ip("198.51.100.4"));

        let mut garbage = HeaderMap::new();
        garbage.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(ClientKey::resolve(&garbage, Some(peer), true), ip("203.0.113.7"));
    }
}
