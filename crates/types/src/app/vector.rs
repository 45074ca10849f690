// Path: crates/types/src/app/vector.rs
//! Types exchanged with the vector index.

use serde::{Deserialize, Serialize};

/// The fixed dimension of every stored vector.
pub const EMBED_DIM: usize = 384;

/// The payload attached to every vector point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VectorPayload {
    pub agent_did: String,
    pub capability_id: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A point to upsert. `point_id` is a fresh random UUID per upsert; points
/// are never reused across re-registrations.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub point_id: String,
    pub vector: Vec<f32>,
    pub payload: VectorPayload,
}

/// A search hit: cosine similarity in `[-1, 1]` plus the stored payload.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub score: f64,
    pub payload: VectorPayload,
}
