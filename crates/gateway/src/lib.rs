// Path: crates/gateway/src/lib.rs
#![forbid(unsafe_code)]

//! HTTP gateway for the Axon agent registry.
//!
//! Routes, middleware, and error envelopes. The admission layers run in a
//! fixed order: request-id context outermost (every response carries
//! `x-request-id`), then the per-IP fixed-window rate limiter, then the
//! API-key guard on the protected routes.

/// Rate limiting, API-key guard, and request-id propagation.
pub mod admission;
/// Route handlers.
pub mod handlers;

use admission::{ApiKeyGuard, FixedWindowLimiter};
use axon_services::Registry;
use axon_types::error::{ErrorCode, RegistryError};
use axum::{
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter_vec, HistogramVec,
    IntCounterVec,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

/// Request bodies above this size are rejected before validation.
pub const BODY_LIMIT_BYTES: usize = 512 * 1024;

// --- Error Handling ---

/// The gateway-side error wrapper mapping [`RegistryError`] kinds onto HTTP
/// statuses and the JSON envelope `{error, statusCode, validation?,
/// details?}`.
pub struct AppError(pub RegistryError);

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RegistryError::BadRequest(_) | RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
            RegistryError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            RegistryError::Unhealthy(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegistryError::Store(_)
            | RegistryError::Index(_)
            | RegistryError::Embed(_)
            | RegistryError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(target: "gateway", code = self.0.code(), error = %self.0, "internal error");
        }

        let mut body = serde_json::json!({
            "error": self.0.to_string(),
            "statusCode": status.as_u16(),
        });
        if let RegistryError::Validation(issues) = &self.0 {
            body["validation"] = serde_json::json!(issues);
        }
        if let Some(details) = self.0.details() {
            body["details"] = serde_json::json!(details);
        }

        let mut response = (status, Json(body)).into_response();
        if let RegistryError::RateLimited { retry_after_secs } = self.0 {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

// --- Metrics (local to gateway) ---

static GATEWAY_REQ_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "axon_gateway_requests_total",
        "Total HTTP gateway requests",
        &["path", "method", "status"]
    )
    .expect("register_int_counter_vec")
});

static GATEWAY_REQ_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "axon_gateway_request_duration_seconds",
        "Latency of HTTP gateway requests (seconds)",
        &["path", "method", "status"],
        exponential_buckets(0.001, 2.0, 15).expect("buckets")
    )
    .expect("register_histogram_vec")
});

pub(crate) fn observe_request(path: &str, method: &str, status: u16, seconds: f64) {
    let status = status.to_string();
    GATEWAY_REQ_TOTAL
        .with_label_values(&[path, method, &status])
        .inc();
    GATEWAY_REQ_LATENCY
        .with_label_values(&[path, method, &status])
        .observe(seconds);
}

// --- Router ---

/// Builds the full application router for the given registry core.
pub fn router(registry: Arc<Registry>) -> Router {
    let config = registry.config().clone();
    let limiter = FixedWindowLimiter::new(config.rate_limit_max, config.rate_limit_window_ms);
    let guard = ApiKeyGuard::new(config.api_key.clone());

    let protected = Router::new()
        .route("/v1/agent/register", post(handlers::register))
        .route("/v1/agent/reputation", post(handlers::reputation))
        .route("/v1/agent/availability", post(handlers::availability))
        .route("/admin/reindex", post(handlers::reindex))
        .route_layer(middleware::from_fn_with_state(
            guard,
            admission::require_api_key,
        ));

    let open = Router::new()
        .route("/v1/agent/discovery", post(handlers::discovery))
        .route("/v1/capability/:id/schema", get(handlers::capability_schema))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics));

    // Layers wrap outside-in: the request-id context is outermost so every
    // response (429s included) carries `x-request-id`; the limiter runs
    // before the API-key guard on the protected routes.
    Router::new()
        .merge(protected)
        .merge(open)
        .with_state(registry)
        .layer(middleware::from_fn_with_state(
            limiter,
            admission::rate_limit,
        ))
        .layer(cors_layer(&config.cors_origin))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn(admission::request_context))
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        CorsLayer::permissive()
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
            Err(_) => {
                tracing::warn!(target: "gateway", origin, "invalid CORS origin, falling back to permissive");
                CorsLayer::permissive()
            }
        }
    }
}

// --- Server ---

/// Binds the listener and serves until the shutdown signal flips.
pub async fn run_server(
    registry: Arc<Registry>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let port = registry.config().port;
    let app = router(registry);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    tracing::info!(target: "gateway", %addr, "registry gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_rx.changed().await.ok();
        tracing::info!(target: "gateway", "shutting down gracefully");
    });

    if let Err(e) = server.await {
        tracing::error!(target: "gateway", error = %e, "server error");
    }

    Ok(())
}
