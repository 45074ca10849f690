// Path: crates/api/src/index/mod.rs
//! The vector-index contract.

use async_trait::async_trait;
use axon_types::app::vector::{VectorHit, VectorPoint};
use axon_types::error::RegistryError;

/// Access to the approximate-nearest-neighbor index.
///
/// The backing collection is named `capabilities`, holds 384-dimension
/// vectors, and scores by cosine similarity.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Creates the collection when absent; idempotent when present.
    async fn ensure_collection(&self) -> Result<(), RegistryError>;

    /// Inserts or replaces one point. Engine error detail must be
    /// preserved in the returned error.
    async fn upsert_point(&self, point: &VectorPoint) -> Result<(), RegistryError>;

    /// Returns at most `limit` hits with cosine similarity in `[-1, 1]`.
    async fn search(&self, vector: &[f32], limit: usize)
        -> Result<Vec<VectorHit>, RegistryError>;

    /// Deletes every point whose payload matches `agentDid == did`.
    async fn delete_by_agent(&self, did: &str) -> Result<(), RegistryError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), RegistryError>;
}
