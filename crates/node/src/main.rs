// Path: crates/node/src/main.rs
#![forbid(unsafe_code)]

//! The Axon agent registry daemon.
//!
//! Startup order: configuration from the environment, structured logging,
//! metadata store connection plus idempotent migration, vector collection
//! bootstrap, then the HTTP gateway with graceful ctrl-c shutdown.

use anyhow::Result;
use axon_api::VectorIndex;
use axon_embed::Embedder;
use axon_services::Registry;
use axon_storage::PostgresStore;
use axon_types::config::RegistryConfig;
use axon_vector::QdrantIndex;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RegistryConfig::from_env()?;
    axon_telemetry::init_tracing(&config.log_level)?;

    let store = PostgresStore::connect(&config.postgres_url).await?;
    store.migrate().await?;
    tracing::info!(target: "node", "metadata store ready");

    let index = QdrantIndex::new(&config.qdrant_url);
    index.ensure_collection().await?;
    tracing::info!(target: "node", "vector index ready");

    let embedder = Embedder::new(&config);

    let registry = Arc::new(Registry::new(
        Arc::new(store),
        Arc::new(index),
        Arc::new(embedder),
        config,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        let _ = shutdown_tx.send(true);
    });

    axon_gateway::run_server(registry, shutdown_rx).await
}
