// Path: crates/api/src/store/mod.rs
//! The metadata-store contract: typed CRUD over agents and capabilities.

use async_trait::async_trait;
use axon_types::app::agent::{AgentRecord, AgentUpsert, CapabilityRecord, NewCapability};
use axon_types::error::RegistryError;
use chrono::{DateTime, Utc};

/// Typed access to the relational metadata store.
///
/// Implementations must guarantee that capability rows cascade-delete with
/// their agent, and that a second startup against an already-migrated
/// database succeeds.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert-or-update keyed on `did`. A null `wallet_address` in the
    /// payload must not overwrite a stored wallet; every other column is
    /// overwritten unconditionally.
    async fn upsert_agent(&self, agent: &AgentUpsert) -> Result<(), RegistryError>;

    /// Deletes every capability row owned by `did`. In the registration
    /// pipeline's replacement order this runs before the vector-index
    /// delete and the per-capability inserts.
    async fn delete_capabilities(&self, did: &str) -> Result<(), RegistryError>;

    /// Inserts a single capability row for `did`. Follows that
    /// capability's vector upsert, so a crash leaves an orphan point
    /// rather than an orphan row.
    async fn insert_capability(
        &self,
        did: &str,
        capability: &NewCapability,
    ) -> Result<(), RegistryError>;

    /// Batched agent lookup for the discovery join.
    async fn find_agents_by_dids(&self, dids: &[String])
        -> Result<Vec<AgentRecord>, RegistryError>;

    /// Case-insensitive substring match against `capability_id` OR
    /// `description`. The adapter may cap the result; the discovery
    /// pipeline caps the merged list.
    async fn search_capabilities_by_keyword(
        &self,
        pattern: &str,
    ) -> Result<Vec<CapabilityRecord>, RegistryError>;

    /// Overwrites the agent's reputation.
    async fn update_reputation(&self, did: &str, reputation: f64) -> Result<(), RegistryError>;

    /// Overwrites the agent's availability and heartbeat timestamp.
    async fn update_availability(
        &self,
        did: &str,
        availability: f64,
        last_seen: DateTime<Utc>,
    ) -> Result<(), RegistryError>;

    /// Returns the stored `output_schema` for a capability id (`Value::Null`
    /// when the capability exists without a schema), or `None` when no such
    /// capability exists.
    async fn get_capability_output_schema(
        &self,
        capability_id: &str,
    ) -> Result<Option<serde_json::Value>, RegistryError>;

    /// Every stored capability, for the admin reindex sweep.
    async fn iterate_all_capabilities(&self) -> Result<Vec<CapabilityRecord>, RegistryError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), RegistryError>;
}
