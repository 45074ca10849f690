// Path: crates/embed/src/http_adapter.rs

use axon_types::error::RegistryError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// A generic HTTP adapter for OpenAI-compatible embedding APIs. This lets
/// the registry drive hosted or self-served sentence-embedding models
/// (text-embedding-3-small, vLLM, Ollama) without linking model weights.
pub struct HttpEmbeddingClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbeddingClient {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_url,
            api_key,
            model,
        }
    }

    /// Requests one embedding vector for `text`. The vector comes back in
    /// the model's native dimension; the caller fits it to the registry
    /// dimension.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RegistryError> {
        let request_body = json!({
            "input": text,
            "model": self.model,
        });

        let mut request = self.client.post(&self.api_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RegistryError::Embed(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".into());
            return Err(RegistryError::Embed(format!(
                "embedding API error: {}",
                error_text
            )));
        }

        let response_body: EmbeddingResponse = response
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| RegistryError::Embed(format!("failed to parse embedding response: {}", e)))?;

        response_body
            .data
            .first()
            .map(|d| d.embedding.clone())
            .ok_or_else(|| RegistryError::Embed("no embedding data returned".into()))
    }
}
