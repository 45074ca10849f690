// Path: crates/embed/src/lib.rs
#![forbid(unsafe_code)]

//! Text embedding for the Axon agent registry.
//!
//! Two paths produce the fixed 384-dimension unit vectors: a model-backed
//! HTTP adapter and a deterministic SHA-256 fallback. The choice is made
//! once per process, on first use: if the model adapter is unconfigured or
//! its probe call fails, the embedder latches to the fallback permanently.
//! There is no automatic recovery; an operator restarts the process to
//! retry the model.

/// The deterministic hash fallback and vector helpers.
pub mod fallback;
/// The OpenAI-compatible HTTP embedding adapter.
pub mod http_adapter;

use async_trait::async_trait;
use axon_api::TextEmbedder;
use axon_types::app::vector::EMBED_DIM;
use axon_types::config::RegistryConfig;
use axon_types::error::RegistryError;
use fallback::{fit_dimension, hash_embed};
use http_adapter::HttpEmbeddingClient;
use tokio::sync::OnceCell;

enum EmbedPath {
    Model(HttpEmbeddingClient),
    Fallback,
}

/// The process-wide embedder with a latched path decision.
pub struct Embedder {
    model: Option<String>,
    api_url: Option<String>,
    api_key: Option<String>,
    path: OnceCell<EmbedPath>,
}

impl Embedder {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            model: config.embed_model.clone(),
            api_url: config.embed_api_url.clone(),
            api_key: config.embed_api_key.clone(),
            path: OnceCell::new(),
        }
    }

    /// An embedder that is pinned to the hash fallback regardless of
    /// configuration.
    pub fn fallback_only() -> Self {
        Self {
            model: None,
            api_url: None,
            api_key: None,
            path: OnceCell::new(),
        }
    }

    /// Resolves the embedding path. Concurrent first callers share one
    /// initialization; the outcome is permanent for the process lifetime.
    async fn resolve_path(&self) -> &EmbedPath {
        self.path
            .get_or_init(|| async {
                let (Some(api_url), Some(model)) = (self.api_url.clone(), self.model.clone())
                else {
                    tracing::info!(
                        target: "embed",
                        "no embedding model configured, using hash fallback"
                    );
                    return EmbedPath::Fallback;
                };
                let client = HttpEmbeddingClient::new(api_url, self.api_key.clone(), model.clone());
                match client.embed("warmup").await {
                    Ok(_) => {
                        tracing::info!(target: "embed", model = %model, "embedding model online");
                        EmbedPath::Model(client)
                    }
                    Err(e) => {
                        tracing::warn!(
                            target: "embed",
                            error = %e,
                            "embedding model probe failed, latching hash fallback"
                        );
                        EmbedPath::Fallback
                    }
                }
            })
            .await
    }
}

#[async_trait]
impl TextEmbedder for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RegistryError> {
        let prepared = text.trim().to_lowercase();
        if prepared.is_empty() {
            return Ok(vec![0.0; EMBED_DIM]);
        }
        match self.resolve_path().await {
            EmbedPath::Model(client) => {
                let raw = client.embed(&prepared).await?;
                Ok(fit_dimension(raw))
            }
            EmbedPath::Fallback => Ok(hash_embed(&prepared)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f64 {
        v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
    }

    #[tokio::test]
    async fn fallback_embeds_to_unit_vector() {
        let embedder = Embedder::fallback_only();
        let v = embedder.embed("summarize a document").await.unwrap();
        assert_eq!(v.len(), EMBED_DIM);
        assert!((norm(&v) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn fallback_is_deterministic() {
        let embedder = Embedder::fallback_only();
        let a = embedder.embed("translate text").await.unwrap();
        let b = embedder.embed("translate text").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn preprocessing_lowercases_and_trims() {
        let embedder = Embedder::fallback_only();
        let a = embedder.embed("  Translate Text  ").await.unwrap();
        let b = embedder.embed("translate text").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn empty_input_is_the_zero_vector() {
        let embedder = Embedder::fallback_only();
        let v = embedder.embed("   ").await.unwrap();
        assert_eq!(v.len(), EMBED_DIM);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn fit_dimension_truncates_and_pads() {
        let long = fallback::fit_dimension(vec![1.0; 512]);
        assert_eq!(long.len(), EMBED_DIM);
        assert!((norm(&long) - 1.0).abs() < 1e-6);

        let short = fallback::fit_dimension(vec![3.0, 4.0]);
        assert_eq!(short.len(), EMBED_DIM);
        assert!((norm(&short) - 1.0).abs() < 1e-6);
        // Padding stays zero after normalization.
        assert!(short[2..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn zero_vector_survives_normalization() {
        let v = fallback::l2_normalize(vec![0.0; EMBED_DIM]);
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
