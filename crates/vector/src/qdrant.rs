// Path: crates/vector/src/qdrant.rs
//! The Qdrant REST adapter.

use async_trait::async_trait;
use axon_api::VectorIndex;
use axon_types::app::vector::{VectorHit, VectorPayload, VectorPoint, EMBED_DIM};
use axon_types::error::RegistryError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// The single collection holding capability vectors.
pub const COLLECTION: &str = "capabilities";

/// REST client for one Qdrant deployment.
pub struct QdrantIndex {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f64,
    #[serde(default)]
    payload: Option<VectorPayload>,
}

impl QdrantIndex {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{}", self.base_url, COLLECTION, suffix)
    }

    /// Maps a non-success response into an index error, preserving the
    /// engine's detail message for diagnosis.
    async fn check(response: reqwest::Response, op: &str) -> Result<reqwest::Response, RegistryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".into());
        Err(RegistryError::Index(format!(
            "{op} failed with status {status}: {detail}"
        )))
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self) -> Result<(), RegistryError> {
        let probe = self
            .client
            .get(self.collection_url(""))
            .send()
            .await
            .map_err(|e| RegistryError::Index(format!("collection probe failed: {e}")))?;
        if probe.status() == StatusCode::NOT_FOUND {
            let create = self
                .client
                .put(self.collection_url(""))
                .json(&json!({
                    "vectors": { "size": EMBED_DIM, "distance": "Cosine" }
                }))
                .send()
                .await
                .map_err(|e| RegistryError::Index(format!("collection create failed: {e}")))?;
            Self::check(create, "create collection").await?;
            tracing::info!(target: "vector", collection = COLLECTION, "collection created");
        } else {
            Self::check(probe, "probe collection").await?;
        }
        Ok(())
    }

    async fn upsert_point(&self, point: &VectorPoint) -> Result<(), RegistryError> {
        let response = self
            .client
            .put(self.collection_url("/points?wait=true"))
            .json(&json!({
                "points": [{
                    "id": point.point_id,
                    "vector": point.vector,
                    "payload": point.payload,
                }]
            }))
            .send()
            .await
            .map_err(|e| RegistryError::Index(format!("point upsert failed: {e}")))?;
        Self::check(response, "upsert point").await?;
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit>, RegistryError> {
        let response = self
            .client
            .post(self.collection_url("/points/search"))
            .json(&json!({
                "vector": vector,
                "limit": limit,
                "with_payload": true,
            }))
            .send()
            .await
            .map_err(|e| RegistryError::Index(format!("search failed: {e}")))?;
        let response = Self::check(response, "search").await?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Index(format!("search response parse failed: {e}")))?;
        Ok(body
            .result
            .into_iter()
            .filter_map(|p| {
                // A point without the expected payload cannot be joined; skip it.
                p.payload.map(|payload| VectorHit {
                    score: p.score,
                    payload,
                })
            })
            .collect())
    }

    async fn delete_by_agent(&self, did: &str) -> Result<(), RegistryError> {
        let response = self
            .client
            .post(self.collection_url("/points/delete?wait=true"))
            .json(&json!({
                "filter": {
                    "must": [{ "key": "agentDid", "match": { "value": did } }]
                }
            }))
            .send()
            .await
            .map_err(|e| RegistryError::Index(format!("delete by agent failed: {e}")))?;
        Self::check(response, "delete by agent").await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        let response = self
            .client
            .get(format!("{}/collections", self.base_url))
            .send()
            .await
            .map_err(|e| RegistryError::Index(format!("ping failed: {e}")))?;
        Self::check(response, "ping").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let index = QdrantIndex::new("http://localhost:6333/");
        assert_eq!(
            index.collection_url(""),
            "http://localhost:6333/collections/capabilities"
        );
        assert_eq!(
            index.collection_url("/points?wait=true"),
            "http://localhost:6333/collections/capabilities/points?wait=true"
        );
    }

    #[test]
    fn payload_serializes_with_camel_case_keys() {
        let payload = VectorPayload {
            agent_did: "did:axon:a".into(),
            capability_id: "echo".into(),
            description: "Echo text".into(),
            tags: vec!["text".into()],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("agentDid").is_some());
        assert!(value.get("capabilityId").is_some());
        assert!(value.get("agent_did").is_none());
    }
}
