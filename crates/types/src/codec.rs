// Path: crates/types/src/codec.rs

//! Defines the canonical, deterministic serialization of agent cards.
//!
//! The canonical form is the signing domain for card signatures, so it is a
//! wire format in its own right: field order is pinned explicitly (never
//! derived from struct layout or map iteration), absent optional fields are
//! rendered as explicit `null`, `metadata` keeps its insertion order, and the
//! output is minimal JSON with no extra whitespace. The same function is used
//! for signing and verification and must stay bit-identical across releases.

use crate::app::card::{AgentCard, CardCapability};
use serde_json::{Map, Value};

/// Canonical top-level field order: `did, endpoint, publicKey, version,
/// lineage, capabilities, metadata`.
pub fn canonicalize_card(card: &AgentCard) -> String {
    let mut root = Map::new();
    root.insert("did".into(), Value::String(card.did.clone()));
    root.insert("endpoint".into(), Value::String(card.endpoint.clone()));
    root.insert("publicKey".into(), Value::String(card.public_key.clone()));
    root.insert("version".into(), Value::from(card.version));
    root.insert(
        "lineage".into(),
        card.lineage.clone().map_or(Value::Null, Value::String),
    );
    root.insert(
        "capabilities".into(),
        Value::Array(
            card.capabilities
                .iter()
                .map(canonicalize_capability)
                .collect(),
        ),
    );
    root.insert(
        "metadata".into(),
        card.metadata.clone().map_or(Value::Null, Value::Object),
    );
    Value::Object(root).to_string()
}

/// Canonical capability field order: `id, description, inputSchema,
/// outputSchema, embeddingDim`.
fn canonicalize_capability(cap: &CardCapability) -> Value {
    let mut m = Map::new();
    m.insert("id".into(), Value::String(cap.id.clone()));
    m.insert(
        "description".into(),
        Value::String(cap.description.clone()),
    );
    m.insert(
        "inputSchema".into(),
        cap.input_schema.clone().unwrap_or(Value::Null),
    );
    m.insert(
        "outputSchema".into(),
        cap.output_schema.clone().unwrap_or(Value::Null),
    );
    m.insert(
        "embeddingDim".into(),
        cap.embedding_dim.map_or(Value::Null, Value::from),
    );
    Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_card() -> AgentCard {
        AgentCard {
            did: "did:axon:alpha".into(),
            endpoint: "https://agent.example/api".into(),
            public_key: "6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5".into(),
            version: 1,
            lineage: None,
            capabilities: vec![CardCapability {
                id: "echo".into(),
                description: "Echo text back".into(),
                input_schema: None,
                output_schema: None,
                embedding_dim: None,
            }],
            metadata: None,
        }
    }

    #[test]
    fn golden_vector_minimal() {
        let expected = concat!(
            r#"{"did":"did:axon:alpha","endpoint":"https://agent.example/api","#,
            r#""publicKey":"6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5","version":1,"#,
            r#""lineage":null,"capabilities":[{"id":"echo","description":"Echo text back","#,
            r#""inputSchema":null,"outputSchema":null,"embeddingDim":null}],"metadata":null}"#
        );
        assert_eq!(canonicalize_card(&minimal_card()), expected);
    }

    #[test]
    fn golden_vector_full() {
        let mut metadata = Map::new();
        metadata.insert("zone".into(), Value::String("eu-west".into()));
        metadata.insert("arch".into(), Value::String("arm64".into()));
        let card = AgentCard {
            lineage: Some("did:axon:alpha-prev".into()),
            capabilities: vec![CardCapability {
                id: "translate".into(),
                description: "Translate text".into(),
                input_schema: Some(serde_json::json!({"type": "string"})),
                output_schema: Some(serde_json::json!({"type": "string"})),
                embedding_dim: Some(384),
            }],
            metadata: Some(metadata),
            ..minimal_card()
        };
        let expected = concat!(
            r#"{"did":"did:axon:alpha","endpoint":"https://agent.example/api","#,
            r#""publicKey":"6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5","version":1,"#,
            r#""lineage":"did:axon:alpha-prev","capabilities":[{"id":"translate","#,
            r#""description":"Translate text","inputSchema":{"type":"string"},"#,
            r#""outputSchema":{"type":"string"},"embeddingDim":384}],"#,
            r#""metadata":{"zone":"eu-west","arch":"arm64"}}"#
        );
        assert_eq!(canonicalize_card(&card), expected);
    }

    #[test]
    fn metadata_preserves_insertion_order() {
        // Keys deliberately in non-alphabetical order; the canonical form
        // must keep them as provided, not sort them.
        let raw = r#"{"zulu":1,"alpha":2,"mike":3}"#;
        let metadata: Map<String, Value> = serde_json::from_str(raw).unwrap();
        let card = AgentCard {
            metadata: Some(metadata),
            ..minimal_card()
        };
        let canonical = canonicalize_card(&card);
        assert!(canonical.ends_with(r#""metadata":{"zulu":1,"alpha":2,"mike":3}}"#));
    }

    #[test]
    fn canonical_form_is_stable_across_calls() {
        let card = minimal_card();
        assert_eq!(canonicalize_card(&card), canonicalize_card(&card));
    }
}
