// Path: crates/types/src/app/agent.rs
//! Stored representations of agents and their capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent row as persisted in the metadata store.
///
/// `did` is the primary identity; everything else is self-reported metadata
/// plus the registry-maintained reputation and availability signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub did: String,
    pub name: Option<String>,
    /// Normalized endpoint URL (no trailing slash).
    pub endpoint: String,
    /// Base58 Ed25519 public key; present iff the agent registered with a card.
    pub public_key: Option<String>,
    /// Lowercased `0x`-prefixed 40-hex wallet; opaque to the registry.
    pub wallet_address: Option<String>,
    /// Reputation in `[0, 1]`.
    pub reputation: f64,
    /// Availability in `[0, 1]`, maintained by heartbeats.
    pub availability_score: f64,
    /// Null until the first heartbeat.
    pub last_seen: Option<DateTime<Utc>>,
    pub card_version: Option<i32>,
    /// Predecessor-did reference carried from the card.
    pub card_lineage: Option<String>,
    /// Base58 detached Ed25519 signature over the canonical card form.
    pub card_signature: Option<String>,
    /// The exact card object as received.
    pub card_raw: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// The writable subset of an agent row, keyed on `did`.
///
/// A null `wallet_address` never overwrites a stored wallet; all other
/// columns are overwritten unconditionally on upsert.
#[derive(Debug, Clone)]
pub struct AgentUpsert {
    pub did: String,
    pub name: Option<String>,
    pub endpoint: String,
    pub public_key: Option<String>,
    pub wallet_address: Option<String>,
    pub card_version: Option<i32>,
    pub card_lineage: Option<String>,
    pub card_signature: Option<String>,
    pub card_raw: Option<serde_json::Value>,
}

/// A capability row as persisted in the metadata store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRecord {
    pub agent_did: String,
    /// Agent-namespaced identifier, unique per agent.
    pub capability_id: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Opaque JSON; never interpreted by the registry.
    pub output_schema: Option<serde_json::Value>,
    /// Opaque to the registry; persisted for external billing integrations.
    pub price_cents: i32,
    pub created_at: DateTime<Utc>,
}

/// A capability about to be inserted during registration.
#[derive(Debug, Clone)]
pub struct NewCapability {
    pub capability_id: String,
    pub description: String,
    pub tags: Vec<String>,
    pub output_schema: Option<serde_json::Value>,
}

pub const DEFAULT_PRICE_CENTS: i32 = 10;
