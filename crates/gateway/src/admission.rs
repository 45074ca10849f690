// Path: crates/gateway/src/admission.rs
//! Admission middleware: per-IP fixed-window rate limiting, the API-key
//! guard on writes, and request-id propagation with access logging.

use crate::AppError;
use axon_types::error::RegistryError;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// --- Rate Limiter ---

#[derive(Clone, Copy)]
struct Window {
    count: u32,
    reset_at_ms: u64,
}

/// Per-client fixed-window counter. Entries are never evicted; memory is
/// bounded by the number of distinct client addresses seen.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    windows: Arc<DashMap<String, Window>>,
    max: u32,
    window_ms: u64,
}

impl FixedWindowLimiter {
    pub fn new(max: u32, window_ms: u64) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max,
            window_ms,
        }
    }

    /// Admits or rejects one request at time `now_ms`. Rejections carry the
    /// whole seconds remaining until the window resets.
    pub fn check(&self, key: &str, now_ms: u64) -> Result<(), u64> {
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at_ms: 0,
        });
        if entry.count == 0 || now_ms > entry.reset_at_ms {
            *entry = Window {
                count: 1,
                reset_at_ms: now_ms + self.window_ms,
            };
            return Ok(());
        }
        if entry.count >= self.max {
            let remaining_ms = entry.reset_at_ms.saturating_sub(now_ms);
            return Err(remaining_ms.div_ceil(1000));
        }
        entry.count += 1;
        Ok(())
    }
}

/// The client key: first `x-forwarded-for` entry when present (trimmed),
/// else the transport peer address, else the literal `"unknown"`.
fn client_key(req: &Request<Body>) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(peer) = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0.ip())
    {
        return peer.to_string();
    }
    "unknown".to_string()
}

pub async fn rate_limit(
    State(limiter): State<FixedWindowLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&req);
    match limiter.check(&key, now_ms()) {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            tracing::debug!(target: "gateway", client = %key, "rate limit tripped");
            AppError(RegistryError::RateLimited { retry_after_secs }).into_response()
        }
    }
}

// --- API Key Guard ---

/// The optional shared write key. When unset, writes are open.
#[derive(Clone)]
pub struct ApiKeyGuard {
    key: Option<Arc<str>>,
}

impl ApiKeyGuard {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.map(Arc::from),
        }
    }
}

fn is_write(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

pub async fn require_api_key(
    State(guard): State<ApiKeyGuard>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !is_write(req.method()) {
        return next.run(req).await;
    }
    let Some(expected) = &guard.key else {
        return next.run(req).await;
    };
    let provided = req.headers().get("x-api-key").and_then(|v| v.to_str().ok());
    if provided == Some(expected.as_ref()) {
        next.run(req).await
    } else {
        AppError(RegistryError::Unauthorized(
            "invalid or missing API key".into(),
        ))
        .into_response()
    }
}

// --- Request ID & Access Log ---

/// Resolves the request id (first non-empty of `x-request-id`,
/// `x-correlation-id`, or a fresh UUID), echoes it on the response, and
/// emits the structured access log with the request duration.
pub async fn request_context(req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let request_id = req
        .headers()
        .get("x-request-id")
        .or_else(|| req.headers().get("x-correlation-id"))
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    let status = response.status().as_u16();
    let duration = started.elapsed();
    crate::observe_request(&path, &method, status, duration.as_secs_f64());
    tracing::info!(
        target: "gateway",
        request_id = %request_id,
        method = %method,
        path = %path,
        status,
        duration_ms = duration.as_millis() as u64,
        "request"
    );
    response
}
