// Path: crates/test_utils/src/lib.rs
//! In-memory doubles of the registry's external stores, plus helpers for
//! producing signed test cards. Behavior mirrors the real adapters closely
//! enough that the pipeline tests exercise the same code paths they run in
//! production.

use async_trait::async_trait;
use axon_api::{MetadataStore, VectorIndex};
use axon_types::app::agent::{
    AgentRecord, AgentUpsert, CapabilityRecord, NewCapability, DEFAULT_PRICE_CENTS,
};
use axon_types::app::card::{AgentCard, CardCapability};
use axon_types::app::vector::{VectorHit, VectorPoint};
use axon_types::error::RegistryError;
use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct StoreInner {
    agents: HashMap<String, AgentRecord>,
    capabilities: Vec<CapabilityRecord>,
}

/// An in-memory [`MetadataStore`].
#[derive(Default)]
pub struct MemoryMetadataStore {
    inner: Mutex<StoreInner>,
    fail_ping: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `ping` calls fail, for health-probe tests.
    pub fn set_ping_failure(&self, fail: bool) {
        self.fail_ping.store(fail, Ordering::SeqCst);
    }

    pub fn agent(&self, did: &str) -> Option<AgentRecord> {
        self.inner.lock().unwrap().agents.get(did).cloned()
    }

    pub fn capabilities_for(&self, did: &str) -> Vec<CapabilityRecord> {
        self.inner
            .lock()
            .unwrap()
            .capabilities
            .iter()
            .filter(|c| c.agent_did == did)
            .cloned()
            .collect()
    }

    /// Directly sets reputation / availability fields, bypassing the
    /// pipelines, for discovery-gate tests.
    pub fn set_agent_signals(
        &self,
        did: &str,
        reputation: f64,
        availability: f64,
        last_seen: Option<DateTime<Utc>>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(agent) = inner.agents.get_mut(did) {
            agent.reputation = reputation;
            agent.availability_score = availability;
            agent.last_seen = last_seen;
        }
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn upsert_agent(&self, agent: &AgentUpsert) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.agents.get_mut(&agent.did) {
            Some(existing) => {
                existing.name = agent.name.clone();
                existing.endpoint = agent.endpoint.clone();
                existing.public_key = agent.public_key.clone();
                if agent.wallet_address.is_some() {
                    existing.wallet_address = agent.wallet_address.clone();
                }
                existing.card_version = agent.card_version;
                existing.card_lineage = agent.card_lineage.clone();
                existing.card_signature = agent.card_signature.clone();
                existing.card_raw = agent.card_raw.clone();
            }
            None => {
                inner.agents.insert(
                    agent.did.clone(),
                    AgentRecord {
                        did: agent.did.clone(),
                        name: agent.name.clone(),
                        endpoint: agent.endpoint.clone(),
                        public_key: agent.public_key.clone(),
                        wallet_address: agent.wallet_address.clone(),
                        reputation: 0.0,
                        availability_score: 0.0,
                        last_seen: None,
                        card_version: agent.card_version,
                        card_lineage: agent.card_lineage.clone(),
                        card_signature: agent.card_signature.clone(),
                        card_raw: agent.card_raw.clone(),
                        created_at: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn delete_capabilities(&self, did: &str) -> Result<(), RegistryError> {
        self.inner
            .lock()
            .unwrap()
            .capabilities
            .retain(|c| c.agent_did != did);
        Ok(())
    }

    async fn insert_capability(
        &self,
        did: &str,
        capability: &NewCapability,
    ) -> Result<(), RegistryError> {
        self.inner.lock().unwrap().capabilities.push(CapabilityRecord {
            agent_did: did.to_string(),
            capability_id: capability.capability_id.clone(),
            description: capability.description.clone(),
            tags: capability.tags.clone(),
            output_schema: capability.output_schema.clone(),
            price_cents: DEFAULT_PRICE_CENTS,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn find_agents_by_dids(
        &self,
        dids: &[String],
    ) -> Result<Vec<AgentRecord>, RegistryError> {
        let inner = self.inner.lock().unwrap();
        Ok(dids
            .iter()
            .filter_map(|did| inner.agents.get(did).cloned())
            .collect())
    }

    async fn search_capabilities_by_keyword(
        &self,
        pattern: &str,
    ) -> Result<Vec<CapabilityRecord>, RegistryError> {
        let needle = pattern.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .capabilities
            .iter()
            .filter(|c| {
                c.capability_id.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn update_reputation(&self, did: &str, reputation: f64) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(agent) = inner.agents.get_mut(did) {
            agent.reputation = reputation;
        }
        Ok(())
    }

    async fn update_availability(
        &self,
        did: &str,
        availability: f64,
        last_seen: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(agent) = inner.agents.get_mut(did) {
            agent.availability_score = availability;
            agent.last_seen = Some(last_seen);
        }
        Ok(())
    }

    async fn get_capability_output_schema(
        &self,
        capability_id: &str,
    ) -> Result<Option<serde_json::Value>, RegistryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .capabilities
            .iter()
            .find(|c| c.capability_id == capability_id)
            .map(|c| c.output_schema.clone().unwrap_or(serde_json::Value::Null)))
    }

    async fn iterate_all_capabilities(&self) -> Result<Vec<CapabilityRecord>, RegistryError> {
        Ok(self.inner.lock().unwrap().capabilities.clone())
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(RegistryError::Store("ping failed".into()));
        }
        Ok(())
    }
}

/// An in-memory [`VectorIndex`] scoring stored unit vectors by dot product.
/// Tests can inject canned hits or force search outages.
#[derive(Default)]
pub struct MemoryVectorIndex {
    points: Mutex<Vec<VectorPoint>>,
    canned_hits: Mutex<Option<Vec<VectorHit>>>,
    fail_search: AtomicBool,
    fail_ping: AtomicBool,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces search results with a fixed hit list.
    pub fn set_canned_hits(&self, hits: Vec<VectorHit>) {
        *self.canned_hits.lock().unwrap() = Some(hits);
    }

    /// Makes subsequent `search` calls fail, for outage tests.
    pub fn set_search_failure(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `ping` calls fail.
    pub fn set_ping_failure(&self, fail: bool) {
        self.fail_ping.store(fail, Ordering::SeqCst);
    }

    pub fn point_count(&self) -> usize {
        self.points.lock().unwrap().len()
    }

    pub fn points_for(&self, did: &str) -> Vec<VectorPoint> {
        self.points
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.payload.agent_did == did)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn ensure_collection(&self) -> Result<(), RegistryError> {
        Ok(())
    }

    async fn upsert_point(&self, point: &VectorPoint) -> Result<(), RegistryError> {
        let mut points = self.points.lock().unwrap();
        points.retain(|p| p.point_id != point.point_id);
        points.push(point.clone());
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit>, RegistryError> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(RegistryError::Index("search unavailable".into()));
        }
        if let Some(canned) = self.canned_hits.lock().unwrap().clone() {
            return Ok(canned.into_iter().take(limit).collect());
        }
        let points = self.points.lock().unwrap();
        let mut hits: Vec<VectorHit> = points
            .iter()
            .map(|p| {
                let score = p
                    .vector
                    .iter()
                    .zip(vector)
                    .map(|(a, b)| (*a as f64) * (*b as f64))
                    .sum::<f64>();
                VectorHit {
                    score,
                    payload: p.payload.clone(),
                }
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn delete_by_agent(&self, did: &str) -> Result<(), RegistryError> {
        self.points
            .lock()
            .unwrap()
            .retain(|p| p.payload.agent_did != did);
        Ok(())
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(RegistryError::Index("ping failed".into()));
        }
        Ok(())
    }
}

/// Builds a card over the given capabilities, signs it with a fresh
/// keypair, and returns the card, its base58 detached signature, and the
/// signing key for tamper tests.
pub fn signed_card(
    did: &str,
    endpoint: &str,
    capabilities: &[(&str, &str)],
) -> (AgentCard, String, SigningKey) {
    let key = axon_crypto::generate_signing_key();
    let card = AgentCard {
        did: did.to_string(),
        endpoint: endpoint.to_string(),
        public_key: axon_crypto::public_key_b58(&key.verifying_key()),
        version: 1,
        lineage: None,
        capabilities: capabilities
            .iter()
            .map(|(id, description)| CardCapability {
                id: id.to_string(),
                description: description.to_string(),
                input_schema: None,
                output_schema: None,
                embedding_dim: None,
            })
            .collect(),
        metadata: None,
    };
    let signature = axon_crypto::sign_card(&card, &key);
    (card, signature, key)
}
