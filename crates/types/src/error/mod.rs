// Path: crates/types/src/error/mod.rs
//! Core error types for the Axon registry.

use serde::Serialize;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// A single field-level validation failure, surfaced in the `validation`
/// array of the error envelope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, e.g. `capabilities.2.description`.
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The registry-wide error taxonomy. Every variant maps to exactly one HTTP
/// status in the gateway.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The request shape or content was invalid.
    #[error("{0}")]
    BadRequest(String),
    /// Schema validation failed with field-level detail.
    #[error("request validation failed")]
    Validation(Vec<ValidationIssue>),
    /// Missing or wrong API key, or an invalid card signature.
    #[error("{0}")]
    Unauthorized(String),
    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The per-IP fixed window is exhausted.
    #[error("rate limit exceeded")]
    RateLimited {
        /// Whole seconds until the window resets.
        retry_after_secs: u64,
    },
    /// A health probe failed.
    #[error("unhealthy: {0}")]
    Unhealthy(String),
    /// The metadata store failed; the engine's detail is preserved.
    #[error("metadata store error: {0}")]
    Store(String),
    /// The vector index failed; the engine's detail is preserved.
    #[error("vector index error: {0}")]
    Index(String),
    /// The embedder failed.
    #[error("embedding error: {0}")]
    Embed(String),
    /// Startup configuration was invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Unhealthy(_) => "UNHEALTHY",
            Self::Store(_) => "STORE_ERROR",
            Self::Index(_) => "INDEX_ERROR",
            Self::Embed(_) => "EMBED_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl RegistryError {
    /// Detail preserved for operational diagnosis on 500-class errors.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Store(d) | Self::Index(d) | Self::Embed(d) => Some(d.clone()),
            _ => None,
        }
    }
}
