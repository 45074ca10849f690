// Path: crates/gateway/src/handlers.rs
//! Route handlers. Bodies are taken as raw JSON and deserialized manually
//! so that shape mismatches surface in the standard error envelope instead
//! of the extractor's plain-text rejection.

use crate::AppError;
use axon_services::Registry;
use axon_types::app::wire::{
    AvailabilityUpdate, CapabilitySchemaResponse, DiscoveryMatch, DiscoveryRequest, OkResponse,
    RegisterRequest, RegisterResponse, ReindexResponse, ReputationUpdate,
};
use axon_types::error::RegistryError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

fn parse<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError(RegistryError::BadRequest(format!("invalid request body: {e}"))))
}

pub async fn register(
    State(registry): State<Arc<Registry>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<RegisterResponse>, AppError> {
    let request: RegisterRequest = parse(body)?;
    Ok(Json(registry.register(request).await?))
}

pub async fn discovery(
    State(registry): State<Arc<Registry>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Vec<DiscoveryMatch>>, AppError> {
    let request: DiscoveryRequest = parse(body)?;
    Ok(Json(registry.discover(request).await?))
}

pub async fn reputation(
    State(registry): State<Arc<Registry>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<OkResponse>, AppError> {
    let request: ReputationUpdate = parse(body)?;
    Ok(Json(registry.update_reputation(request).await?))
}

pub async fn availability(
    State(registry): State<Arc<Registry>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<OkResponse>, AppError> {
    let request: AvailabilityUpdate = parse(body)?;
    Ok(Json(registry.update_availability(request).await?))
}

pub async fn capability_schema(
    State(registry): State<Arc<Registry>>,
    Path(id): Path<String>,
) -> Result<Json<CapabilitySchemaResponse>, AppError> {
    Ok(Json(registry.capability_schema(&id).await?))
}

pub async fn reindex(
    State(registry): State<Arc<Registry>>,
) -> Result<Json<ReindexResponse>, AppError> {
    Ok(Json(registry.reindex().await?))
}

/// `{ok: true}` when both stores answer, `{ok: false, error}` with 503
/// otherwise. No admission checks apply here.
pub async fn health(State(registry): State<Arc<Registry>>) -> Response {
    match registry.health().await {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "ok": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn metrics() -> ([(axum::http::HeaderName, String); 1], axum::body::Bytes) {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::with_capacity(1 << 16);
    if let Err(e) = prometheus::Encoder::encode(&encoder, &metric_families, &mut buf) {
        tracing::error!(target: "gateway", error = %e, "failed to encode prometheus metrics");
    }
    (
        [(
            axum::http::header::CONTENT_TYPE,
            prometheus::Encoder::format_type(&encoder).to_string(),
        )],
        buf.into(),
    )
}
