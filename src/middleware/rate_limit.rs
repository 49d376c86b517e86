use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed-window counter per client IP. The window resets lazily on the next
/// request after it elapses.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    buckets: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let mut guard = self.buckets.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();

        // Drop stale windows so the map does not grow without bound.
        if guard.len() > 10_000 {
            let window = self.window;
            guard.retain(|_, w| now.duration_since(w.start) < window);
        }

        let entry = guard.entry(key.to_string()).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if now.duration_since(entry.start) >= self.window {
            entry.start = now;
            entry.count = 0;
        }
        if entry.count < self.max_requests {
            entry.count += 1;
            true
        } else {
            false
        }
    }
}

/// Behind the reverse proxy the client address arrives in x-forwarded-for.
fn client_key(req: &Request<Body>) -> String {
    for header in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = req.headers().get(header) {
            if let Ok(value) = value.to_str() {
                if let Some(ip) = value.split(',').next() {
                    let ip = ip.trim();
                    if !ip.is_empty() {
                        return ip.to_string();
                    }
                }
            }
        }
    }
    "unknown".to_string()
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.allow(&client_key(&req)) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "message": "Too many requests from this IP, please try again later",
            })),
        )
            .into_response();
    }
    next.run(req).await
}

/// General API limit: 200 requests / 15 minutes / IP.
pub fn api_limiter(max_requests: u32) -> RateLimiter {
    RateLimiter::new(max_requests, Duration::from_secs(15 * 60))
}

/// Auth endpoints: 10 attempts / 15 minutes / IP.
pub fn auth_limiter(max_requests: u32) -> RateLimiter {
    RateLimiter::new(max_requests, Duration::from_secs(15 * 60))
}

/// Public lead creation: 5 submissions / minute / IP.
pub fn lead_limiter(max_requests: u32) -> RateLimiter {
    RateLimiter::new(max_requests, Duration::from_secs(60))
}
