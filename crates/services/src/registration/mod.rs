// Path: crates/services/src/registration/mod.rs
//! The registration pipeline: parse → validate → verify card → atomic
//! replace → upsert vectors.

use crate::validate::validate_register;
use crate::Registry;
use axon_types::app::agent::{AgentUpsert, NewCapability};
use axon_types::app::card::normalize_endpoint;
use axon_types::app::vector::{VectorPayload, VectorPoint};
use axon_types::app::wire::{RegisterRequest, RegisterResponse};
use axon_types::error::RegistryError;
use std::collections::HashSet;
use uuid::Uuid;

impl Registry {
    /// Registers (or re-registers) an agent.
    ///
    /// The replacement is atomic from the client's view: the agent row is
    /// upserted, then all old capability rows and vector points are deleted
    /// before the first new capability lands. Within the per-capability
    /// loop the vector upsert precedes the relational insert, so a crash
    /// leaves an orphan point (healed by the next register's delete) rather
    /// than an orphan row. Registration is idempotent by `did`, so clients
    /// retry 500s safely.
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, RegistryError> {
        validate_register(&req)?;

        let wallet_address = req.wallet_address.as_ref().map(|w| w.to_lowercase());
        let capabilities = normalized_capabilities(&req);

        let agent = match (&req.card, &req.card_signature) {
            (Some(card), Some(signature)) => {
                // Body endpoint wins when present and non-empty; the card's
                // endpoint is the fallback.
                let normalized_endpoint = normalize_endpoint(
                    req.endpoint
                        .as_deref()
                        .filter(|e| !e.is_empty())
                        .or(Some(card.endpoint.as_str())),
                )
                .ok_or_else(|| RegistryError::BadRequest("endpoint must be non-empty".into()))?;
                if card.did != req.did {
                    return Err(RegistryError::BadRequest(
                        "card.did does not match body did".into(),
                    ));
                }
                if normalize_endpoint(Some(&card.endpoint)).as_deref()
                    != Some(normalized_endpoint.as_str())
                {
                    return Err(RegistryError::BadRequest(
                        "card.endpoint does not match body endpoint".into(),
                    ));
                }
                if !axon_crypto::verify_card(card, signature) {
                    return Err(RegistryError::Unauthorized("invalid card signature".into()));
                }
                let declared: HashSet<&str> =
                    card.capabilities.iter().map(|c| c.id.as_str()).collect();
                for capability in &capabilities {
                    if !declared.contains(capability.capability_id.as_str()) {
                        return Err(RegistryError::BadRequest(format!(
                            "capability '{}' is not declared in the signed card",
                            capability.capability_id
                        )));
                    }
                }
                AgentUpsert {
                    did: req.did.clone(),
                    name: req.name.clone(),
                    endpoint: normalized_endpoint,
                    public_key: Some(card.public_key.clone()),
                    wallet_address,
                    card_version: Some(card.version),
                    card_lineage: card.lineage.clone(),
                    card_signature: Some(signature.clone()),
                    card_raw: serde_json::to_value(card).ok(),
                }
            }
            _ => {
                let normalized_endpoint = normalize_endpoint(req.endpoint.as_deref())
                    .ok_or_else(|| RegistryError::BadRequest("endpoint must be non-empty".into()))?;
                AgentUpsert {
                    did: req.did.clone(),
                    name: req.name.clone(),
                    endpoint: normalized_endpoint,
                    public_key: None,
                    wallet_address,
                    card_version: None,
                    card_lineage: None,
                    card_signature: None,
                    card_raw: None,
                }
            }
        };

        self.store().upsert_agent(&agent).await?;
        self.store().delete_capabilities(&req.did).await?;
        self.index().delete_by_agent(&req.did).await?;

        for capability in &capabilities {
            let vector = self.embedder().embed(&embedding_input(capability)).await?;
            self.index()
                .upsert_point(&VectorPoint {
                    point_id: Uuid::new_v4().to_string(),
                    vector,
                    payload: VectorPayload {
                        agent_did: req.did.clone(),
                        capability_id: capability.capability_id.clone(),
                        description: capability.description.clone(),
                        tags: capability.tags.clone(),
                    },
                })
                .await?;
            self.store().insert_capability(&req.did, capability).await?;
        }

        tracing::info!(
            target: "registration",
            did = %req.did,
            capabilities = capabilities.len(),
            signed = req.card.is_some(),
            "agent registered"
        );
        Ok(RegisterResponse {
            ok: true,
            registered: capabilities.len(),
        })
    }
}

/// Resolves submitted capabilities to their stored shape, assigning a
/// fresh UUID to each missing capability id.
fn normalized_capabilities(req: &RegisterRequest) -> Vec<NewCapability> {
    req.capabilities
        .iter()
        .map(|c| NewCapability {
            capability_id: c
                .capability_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            description: c.description.clone(),
            tags: c.tags.clone(),
            output_schema: c.output_schema.clone(),
        })
        .collect()
}

/// The text handed to the embedder for one capability:
/// `"{id} {description} {output_schema_or_empty} {tags_joined}"`, trimmed.
pub(crate) fn embedding_input(capability: &NewCapability) -> String {
    let schema = capability
        .output_schema
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_default();
    format!(
        "{} {} {} {}",
        capability.capability_id,
        capability.description,
        schema,
        capability.tags.join(" ")
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_input_concatenates_and_trims() {
        let capability = NewCapability {
            capability_id: "summarize".into(),
            description: "Summarize a document".into(),
            tags: vec!["nlp".into(), "text".into()],
            output_schema: Some(serde_json::json!({"type": "string"})),
        };
        assert_eq!(
            embedding_input(&capability),
            r#"summarize Summarize a document {"type":"string"} nlp text"#
        );

        let bare = NewCapability {
            capability_id: "echo".into(),
            description: "Echo".into(),
            tags: vec![],
            output_schema: None,
        };
        // No schema and no tags: inner gap stays, ends are trimmed.
        assert_eq!(embedding_input(&bare), "echo Echo");
    }
}
