// Path: crates/vector/src/lib.rs
#![forbid(unsafe_code)]

//! Qdrant-backed vector index for the Axon agent registry.
//!
//! A thin REST adapter: one collection named `capabilities` holding
//! 384-dimension cosine-scored vectors, one point per registered
//! capability.

pub mod qdrant;

pub use qdrant::QdrantIndex;
