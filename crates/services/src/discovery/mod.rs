// Path: crates/services/src/discovery/mod.rs
//! The hybrid discovery pipeline: embed → ANN search → lexical fallback →
//! merge/dedupe → join → availability gate → score → sort.

use crate::validate::validate_discovery;
use crate::Registry;
use axon_types::app::agent::AgentRecord;
use axon_types::app::vector::VectorHit;
use axon_types::app::wire::{AgentSummary, DiscoveryMatch, DiscoveryRequest};
use axon_types::error::RegistryError;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

impl Registry {
    /// Runs a discovery query and returns the ranked result list.
    ///
    /// The vector leg is best-effort: an embedder or index failure is
    /// logged and the pipeline continues with lexical hits only. The
    /// lexical leg always runs, so a freshly registered capability is
    /// discoverable by substring even with no working model.
    pub async fn discover(
        &self,
        req: DiscoveryRequest,
    ) -> Result<Vec<DiscoveryMatch>, RegistryError> {
        let (limit, min_reputation) = validate_discovery(&req, self.config().min_rep_discover)?;
        let limit = limit as usize;

        let mut hits = match self.vector_leg(&req.query, limit).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    target: "discovery",
                    error = %e,
                    "vector search unavailable, continuing with lexical hits only"
                );
                Vec::new()
            }
        };

        // The lexical fallback always runs; its hits are appended after the
        // vector hits so deduplication keeps the cosine score.
        let lexical_score = self.config().lexical_score;
        for capability in self
            .store()
            .search_capabilities_by_keyword(&req.query)
            .await?
        {
            hits.push(VectorHit {
                score: lexical_score,
                payload: axon_types::app::vector::VectorPayload {
                    agent_did: capability.agent_did,
                    capability_id: capability.capability_id,
                    description: capability.description,
                    tags: capability.tags,
                },
            });
        }

        let hits = dedupe_hits(hits);

        let dids: Vec<String> = {
            let mut seen = HashSet::new();
            hits.iter()
                .filter(|h| seen.insert(h.payload.agent_did.clone()))
                .map(|h| h.payload.agent_did.clone())
                .collect()
        };
        let agents: HashMap<String, AgentRecord> = self
            .store()
            .find_agents_by_dids(&dids)
            .await?
            .into_iter()
            .map(|a| (a.did.clone(), a))
            .collect();

        let now = Utc::now();
        let stale_after_ms = 2 * self.config().heartbeat_ttl_ms;
        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let agent = agents.get(&hit.payload.agent_did);
            let reputation = agent.map(|a| a.reputation).unwrap_or(0.0);
            let availability = agent.and_then(|a| effective_availability(a, now, stale_after_ms));

            // An agent heartbeating at zero (or gone stale) is not served;
            // one that never heartbeated is still discoverable.
            if matches!(availability, Some(a) if a <= 0.0) {
                continue;
            }
            if reputation < min_reputation {
                continue;
            }

            let reputation_score = reputation.clamp(0.0, 1.0);
            let score = self.config().search_weight_sim * hit.score
                + self.config().search_weight_rep * reputation_score
                + self.config().search_weight_avail * availability.unwrap_or(0.0);

            results.push(DiscoveryMatch {
                score,
                vector_score: hit.score,
                reputation_score,
                availability_score: availability,
                agent_did: hit.payload.agent_did,
                capability_id: hit.payload.capability_id,
                description: hit.payload.description,
                tags: hit.payload.tags,
                reputation,
                agent: agent.map(summarize),
            });
        }

        // Stable sort: ties keep the merged insertion order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);
        Ok(results)
    }

    async fn vector_leg(&self, query: &str, limit: usize) -> Result<Vec<VectorHit>, RegistryError> {
        let vector = self.embedder().embed(query).await?;
        self.index().search(&vector, limit).await
    }
}

/// Drops duplicate `(agentDid, capabilityId)` pairs, keeping the first
/// occurrence.
fn dedupe_hits(hits: Vec<VectorHit>) -> Vec<VectorHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|h| seen.insert((h.payload.agent_did.clone(), h.payload.capability_id.clone())))
        .collect()
}

/// The availability used for gating and scoring: `None` until the first
/// heartbeat, forced to zero once the last heartbeat is older than twice
/// the TTL.
fn effective_availability(
    agent: &AgentRecord,
    now: DateTime<Utc>,
    stale_after_ms: u64,
) -> Option<f64> {
    let last_seen = agent.last_seen?;
    let age_ms = now.signed_duration_since(last_seen).num_milliseconds();
    if age_ms > stale_after_ms as i64 {
        Some(0.0)
    } else {
        Some(agent.availability_score)
    }
}

fn summarize(agent: &AgentRecord) -> AgentSummary {
    AgentSummary {
        did: agent.did.clone(),
        name: agent.name.clone(),
        endpoint: agent.endpoint.clone(),
        reputation: agent.reputation,
        availability_score: agent.availability_score,
        last_seen: agent.last_seen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_types::app::vector::VectorPayload;
    use chrono::Duration;

    fn hit(did: &str, cap: &str, score: f64) -> VectorHit {
        VectorHit {
            score,
            payload: VectorPayload {
                agent_did: did.into(),
                capability_id: cap.into(),
                description: String::new(),
                tags: vec![],
            },
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let hits = dedupe_hits(vec![
            hit("a", "cap1", 0.9),
            hit("b", "cap2", 0.45),
            hit("a", "cap1", 0.45),
        ]);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, 0.9);
        assert_eq!(hits[1].payload.agent_did, "b");
    }

    fn agent_with(last_seen: Option<DateTime<Utc>>, availability: f64) -> AgentRecord {
        AgentRecord {
            did: "did:axon:a".into(),
            name: None,
            endpoint: "http://h".into(),
            public_key: None,
            wallet_address: None,
            reputation: 0.5,
            availability_score: availability,
            last_seen,
            card_version: None,
            card_lineage: None,
            card_signature: None,
            card_raw: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stale_agents_lose_their_availability() {
        let now = Utc::now();
        let ttl_ms = 60_000u64;

        let fresh = agent_with(Some(now - Duration::milliseconds(1_000)), 0.8);
        assert_eq!(effective_availability(&fresh, now, 2 * ttl_ms), Some(0.8));

        let stale = agent_with(Some(now - Duration::milliseconds(3 * 60_000)), 1.0);
        assert_eq!(effective_availability(&stale, now, 2 * ttl_ms), Some(0.0));

        let silent = agent_with(None, 1.0);
        assert_eq!(effective_availability(&silent, now, 2 * ttl_ms), None);
    }
}
