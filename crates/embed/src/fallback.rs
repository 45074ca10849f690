// Path: crates/embed/src/fallback.rs
//! Deterministic hash-based embedding, used when no model is available.
//!
//! The vector is derived from SHA-256 of the (already lowercased and
//! trimmed) input: `v[i] = hash[i mod 32] / 127.5 - 1`, L2-normalized.
//! Nearby texts do not land near each other in this space; the fallback
//! exists so that registration and the lexical discovery path keep working
//! without a model, not to approximate semantic similarity.

use axon_types::app::vector::EMBED_DIM;
use sha2::{Digest, Sha256};

/// Embeds pre-processed text into a deterministic unit vector of
/// [`EMBED_DIM`] elements.
pub fn hash_embed(prepared: &str) -> Vec<f32> {
    let hash = Sha256::digest(prepared.as_bytes());
    let raw: Vec<f32> = (0..EMBED_DIM)
        .map(|i| (hash[i % 32] as f32) / 127.5 - 1.0)
        .collect();
    l2_normalize(raw)
}

/// Scales a vector to Euclidean norm 1. A zero vector stays zero.
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x = ((*x as f64) / norm) as f32;
        }
    }
    v
}

/// Fits a model-produced vector to [`EMBED_DIM`]: truncate when larger,
/// zero-pad when smaller, then re-normalize.
pub fn fit_dimension(mut v: Vec<f32>) -> Vec<f32> {
    v.resize(EMBED_DIM, 0.0);
    l2_normalize(v)
}
