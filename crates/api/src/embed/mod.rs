// Path: crates/api/src/embed/mod.rs
//! The text-embedding contract.

use async_trait::async_trait;
use axon_types::error::RegistryError;

/// Text to fixed-dimension unit vector.
///
/// Implementations return vectors of [`axon_types::app::vector::EMBED_DIM`]
/// elements with Euclidean norm 1, except for empty input which embeds to
/// the zero vector.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RegistryError>;
}
