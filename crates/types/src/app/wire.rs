// Path: crates/types/src/app/wire.rs
//! Request and response bodies of the HTTP surface.
//!
//! Field names follow the public API: camelCase for card-adjacent payloads,
//! with snake_case aliases where older clients used them.

use crate::app::card::AgentCard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/agent/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub did: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default, rename = "walletAddress", alias = "wallet_address")]
    pub wallet_address: Option<String>,
    pub capabilities: Vec<RegisterCapability>,
    #[serde(default, alias = "acard")]
    pub card: Option<AgentCard>,
    #[serde(default, alias = "acard_signature", alias = "cardSignature")]
    pub card_signature: Option<String>,
}

/// One submitted capability. `capabilityId` is the canonical spelling;
/// `capability_id` is accepted as a legacy alias. Missing ids are assigned
/// fresh UUIDs during registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCapability {
    #[serde(default, rename = "capabilityId", alias = "capability_id")]
    pub capability_id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "inputSchema")]
    pub input_schema: Option<serde_json::Value>,
    #[serde(default, alias = "outputSchema")]
    pub output_schema: Option<serde_json::Value>,
}

/// Body of `POST /v1/agent/discovery`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, rename = "minReputation", alias = "min_reputation")]
    pub min_reputation: Option<f64>,
}

/// One ranked discovery result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMatch {
    /// The combined linear score.
    pub score: f64,
    /// Cosine similarity, or the lexical stand-in score.
    pub vector_score: f64,
    /// Reputation clamped to `[0, 1]` as used in the score.
    pub reputation_score: f64,
    /// Effective availability; null when the agent has never heartbeated.
    pub availability_score: Option<f64>,
    pub agent_did: String,
    pub capability_id: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Raw stored reputation.
    pub reputation: f64,
    /// Joined agent metadata, or null when the agent row was missing.
    pub agent: Option<AgentSummary>,
}

/// Joined agent metadata attached to a discovery result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub did: String,
    pub name: Option<String>,
    pub endpoint: String,
    pub reputation: f64,
    pub availability_score: f64,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Body of `POST /v1/agent/reputation`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReputationUpdate {
    pub did: String,
    pub reputation: f64,
}

/// Body of `POST /v1/agent/availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityUpdate {
    pub did: String,
    pub availability: f64,
    /// RFC 3339; defaults to the server clock when absent.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Response of `POST /v1/agent/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub registered: usize,
}

/// Response of `GET /v1/capability/{id}/schema`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySchemaResponse {
    pub capability_id: String,
    pub output_schema: Option<serde_json::Value>,
}

/// Response of `POST /admin/reindex`.
#[derive(Debug, Clone, Serialize)]
pub struct ReindexResponse {
    pub ok: bool,
    pub reindexed: usize,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_both_capability_id_spellings() {
        let body = serde_json::json!({
            "did": "did:axon:a",
            "capabilities": [
                {"capabilityId": "cap.camel", "description": "camel"},
                {"capability_id": "cap.snake", "description": "snake"}
            ]
        });
        let req: RegisterRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.capabilities[0].capability_id.as_deref(), Some("cap.camel"));
        assert_eq!(req.capabilities[1].capability_id.as_deref(), Some("cap.snake"));
    }

    #[test]
    fn register_accepts_acard_alias() {
        let body = serde_json::json!({
            "did": "did:axon:a",
            "capabilities": [{"description": "echo"}],
            "acard": {
                "did": "did:axon:a",
                "endpoint": "http://h",
                "publicKey": "pk",
                "version": 1,
                "capabilities": [{"id": "c", "description": "echo"}]
            },
            "acard_signature": "sig"
        });
        let req: RegisterRequest = serde_json::from_value(body).unwrap();
        assert!(req.card.is_some());
        assert_eq!(req.card_signature.as_deref(), Some("sig"));
    }
}
