// Path: crates/telemetry/src/lib.rs
//! Observability for the Axon agent registry: structured JSON logging on
//! stderr, filtered by `LOG_LEVEL` (or `RUST_LOG` when set).

/// The initialization routine for global structured logging.
pub mod init;

pub use init::init_tracing;
