// Path: crates/crypto/src/sign/tests.rs
use super::*;
use axon_types::app::card::{AgentCard, CardCapability};

fn card_for(public_key: String) -> AgentCard {
    AgentCard {
        did: "did:axon:tester".into(),
        endpoint: "https://tester.example".into(),
        public_key,
        version: 1,
        lineage: None,
        capabilities: vec![CardCapability {
            id: "summarize".into(),
            description: "Summarize a document".into(),
            input_schema: None,
            output_schema: Some(serde_json::json!({"type": "string"})),
            embedding_dim: Some(384),
        }],
        metadata: None,
    }
}

#[test]
fn sign_then_verify_roundtrip() {
    let key = generate_signing_key();
    let card = card_for(public_key_b58(&key.verifying_key()));
    let signature = sign_card(&card, &key);
    assert!(verify_card(&card, &signature));
}

#[test]
fn any_mutated_field_fails_verification() {
    let key = generate_signing_key();
    let card = card_for(public_key_b58(&key.verifying_key()));
    let signature = sign_card(&card, &key);

    let mut tampered = card.clone();
    tampered.endpoint = "https://evil.example".into();
    assert!(!verify_card(&tampered, &signature));

    let mut tampered = card.clone();
    tampered.capabilities[0].description = "Summarize a document.".into();
    assert!(!verify_card(&tampered, &signature));

    let mut tampered = card.clone();
    tampered.version = 2;
    assert!(!verify_card(&tampered, &signature));
}

#[test]
fn wrong_key_fails_verification() {
    let key = generate_signing_key();
    let other = generate_signing_key();
    // Card claims `other`'s key but is signed with `key`.
    let card = card_for(public_key_b58(&other.verifying_key()));
    let signature = sign_card(&card, &key);
    assert!(!verify_card(&card, &signature));
}

#[test]
fn malformed_encodings_are_false_not_errors() {
    let key = generate_signing_key();
    let card = card_for(public_key_b58(&key.verifying_key()));
    let signature = sign_card(&card, &key);

    // Not base58 at all.
    assert!(!verify_card(&card, "not-base58-0OIl"));
    // Valid base58 but wrong length for a signature.
    assert!(!verify_card(&card, "3mJr7AoUXx2Wqd"));

    // Garbage public key with an otherwise valid signature.
    let mut bad_key = card.clone();
    bad_key.public_key = "3mJr7AoUXx2Wqd".into();
    assert!(!verify_card(&bad_key, &signature));
}
