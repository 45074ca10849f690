// Path: crates/api/src/lib.rs
//! Core traits for the Axon agent registry.
//!
//! The pipelines in `axon-services` are written entirely against these
//! traits; the concrete Postgres, Qdrant, and embedder adapters live in
//! their own crates, and the in-memory doubles in `axon-test-utils`
//! implement the same contracts for tests.

/// The text-embedding contract.
pub mod embed;
/// The vector-index contract.
pub mod index;
/// The metadata-store contract.
pub mod store;

pub use embed::TextEmbedder;
pub use index::VectorIndex;
pub use store::MetadataStore;
