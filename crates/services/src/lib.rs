// Path: crates/services/src/lib.rs
#![forbid(unsafe_code)]

//! The Axon registry pipelines.
//!
//! [`Registry`] wires the metadata store, the vector index, and the
//! embedder together and exposes the operations the gateway serves:
//! registration, discovery, reputation and availability updates, the
//! capability schema lookup, health, and the admin reindex sweep.

/// Reputation, availability, schema lookup, health, and reindex.
pub mod admin;
/// The hybrid discovery pipeline.
pub mod discovery;
/// The registration pipeline.
pub mod registration;
/// Request validation shared by the pipelines.
pub mod validate;

use axon_api::{MetadataStore, TextEmbedder, VectorIndex};
use axon_types::config::RegistryConfig;
use std::sync::Arc;

/// The registry core, shared across request handlers.
pub struct Registry {
    store: Arc<dyn MetadataStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn TextEmbedder>,
    config: RegistryConfig,
}

impl Registry {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn TextEmbedder>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            store,
            index,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &dyn MetadataStore {
        self.store.as_ref()
    }

    pub(crate) fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    pub(crate) fn embedder(&self) -> &dyn TextEmbedder {
        self.embedder.as_ref()
    }
}
