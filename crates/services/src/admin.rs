// Path: crates/services/src/admin.rs
//! Reputation and availability updates, the capability schema lookup,
//! health probes, and the admin reindex sweep.

use crate::registration::embedding_input;
use crate::validate::validate_unit_interval;
use crate::Registry;
use axon_types::app::agent::NewCapability;
use axon_types::app::vector::{VectorPayload, VectorPoint};
use axon_types::app::wire::{
    AvailabilityUpdate, CapabilitySchemaResponse, OkResponse, ReindexResponse, ReputationUpdate,
};
use axon_types::error::RegistryError;
use chrono::Utc;
use uuid::Uuid;

impl Registry {
    /// Overwrites an agent's reputation.
    pub async fn update_reputation(
        &self,
        req: ReputationUpdate,
    ) -> Result<OkResponse, RegistryError> {
        validate_unit_interval("reputation", req.reputation)?;
        self.store()
            .update_reputation(&req.did, req.reputation)
            .await?;
        Ok(OkResponse { ok: true })
    }

    /// Records a heartbeat: availability plus a last-seen timestamp that
    /// defaults to the server clock.
    pub async fn update_availability(
        &self,
        req: AvailabilityUpdate,
    ) -> Result<OkResponse, RegistryError> {
        validate_unit_interval("availability", req.availability)?;
        let last_seen = req.last_seen.unwrap_or_else(Utc::now);
        self.store()
            .update_availability(&req.did, req.availability, last_seen)
            .await?;
        Ok(OkResponse { ok: true })
    }

    /// Looks up the stored output schema of a capability.
    pub async fn capability_schema(
        &self,
        capability_id: &str,
    ) -> Result<CapabilitySchemaResponse, RegistryError> {
        match self
            .store()
            .get_capability_output_schema(capability_id)
            .await?
        {
            Some(schema) => Ok(CapabilitySchemaResponse {
                capability_id: capability_id.to_string(),
                output_schema: Some(schema),
            }),
            None => Err(RegistryError::NotFound(format!(
                "capability '{capability_id}' not found"
            ))),
        }
    }

    /// Pings both stores; the first failure surfaces as unhealthy.
    pub async fn health(&self) -> Result<(), RegistryError> {
        self.store()
            .ping()
            .await
            .map_err(|e| RegistryError::Unhealthy(e.to_string()))?;
        self.index()
            .ping()
            .await
            .map_err(|e| RegistryError::Unhealthy(e.to_string()))?;
        Ok(())
    }

    /// Re-embeds every stored capability and rebuilds its vector points,
    /// agent by agent. Not transactional: a mid-sweep failure leaves the
    /// index partially updated and is corrected by running again.
    pub async fn reindex(&self) -> Result<ReindexResponse, RegistryError> {
        let capabilities = self.store().iterate_all_capabilities().await?;

        // Group per agent, preserving store order, so each agent's stale
        // points are dropped exactly once before its fresh upserts.
        let mut order: Vec<String> = Vec::new();
        let mut grouped: std::collections::HashMap<String, Vec<NewCapability>> =
            std::collections::HashMap::new();
        for capability in capabilities {
            if !grouped.contains_key(&capability.agent_did) {
                order.push(capability.agent_did.clone());
            }
            grouped
                .entry(capability.agent_did.clone())
                .or_default()
                .push(NewCapability {
                    capability_id: capability.capability_id,
                    description: capability.description,
                    tags: capability.tags,
                    output_schema: capability.output_schema,
                });
        }

        let mut reindexed = 0usize;
        for did in order {
            self.index().delete_by_agent(&did).await?;
            let Some(capabilities) = grouped.get(&did) else {
                continue;
            };
            for capability in capabilities {
                let vector = self.embedder().embed(&embedding_input(capability)).await?;
                self.index()
                    .upsert_point(&VectorPoint {
                        point_id: Uuid::new_v4().to_string(),
                        vector,
                        payload: VectorPayload {
                            agent_did: did.clone(),
                            capability_id: capability.capability_id.clone(),
                            description: capability.description.clone(),
                            tags: capability.tags.clone(),
                        },
                    })
                    .await?;
                reindexed += 1;
            }
        }

        tracing::info!(target: "admin", reindexed, "reindex sweep complete");
        Ok(ReindexResponse {
            ok: true,
            reindexed,
        })
    }
}
