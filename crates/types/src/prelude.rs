// Path: crates/types/src/prelude.rs
//! Commonly used re-exports for downstream crates.

pub use crate::app::agent::{AgentRecord, AgentUpsert, CapabilityRecord, NewCapability};
pub use crate::app::card::{normalize_endpoint, AgentCard, CardCapability};
pub use crate::app::vector::{VectorHit, VectorPayload, VectorPoint};
pub use crate::app::wire::{
    AgentSummary, AvailabilityUpdate, CapabilitySchemaResponse, DiscoveryMatch, DiscoveryRequest,
    OkResponse, RegisterCapability, RegisterRequest, RegisterResponse, ReindexResponse,
    ReputationUpdate,
};
pub use crate::config::RegistryConfig;
pub use crate::error::{ErrorCode, RegistryError, ValidationIssue};
