// Path: crates/types/src/app/card.rs
//! The self-describing, Ed25519-signed agent card.

use serde::{Deserialize, Serialize};

/// A signed agent card: self-described metadata plus the claimed capability
/// set. The signature covers the canonical serialization produced by
/// [`crate::codec::canonicalize_card`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub did: String,
    pub endpoint: String,
    /// Base58 of the Ed25519 public key the card is signed with.
    pub public_key: String,
    pub version: i32,
    /// Predecessor-did reference for card succession.
    #[serde(default)]
    pub lineage: Option<String>,
    pub capabilities: Vec<CardCapability>,
    /// Opaque map; insertion order is part of the signing domain.
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A capability as enumerated inside a signed card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardCapability {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: Option<serde_json::Value>,
    #[serde(default)]
    pub output_schema: Option<serde_json::Value>,
    #[serde(default)]
    pub embedding_dim: Option<i32>,
}

/// Normalizes an endpoint URL. The only transform is stripping one trailing
/// slash; null or empty input normalizes to `None`.
pub fn normalize_endpoint(url: Option<&str>) -> Option<String> {
    let url = url?;
    if url.is_empty() {
        return None;
    }
    let stripped = url.strip_suffix('/').unwrap_or(url);
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_one_trailing_slash() {
        assert_eq!(
            normalize_endpoint(Some("http://h/")),
            Some("http://h".to_string())
        );
        assert_eq!(
            normalize_endpoint(Some("http://h")),
            Some("http://h".to_string())
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_endpoint(Some("https://agent.example/api/"));
        let twice = normalize_endpoint(once.as_deref());
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_empty_is_none() {
        assert_eq!(normalize_endpoint(None), None);
        assert_eq!(normalize_endpoint(Some("")), None);
        assert_eq!(normalize_endpoint(Some("/")), None);
    }
}
