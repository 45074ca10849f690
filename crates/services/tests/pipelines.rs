// Path: crates/services/tests/pipelines.rs
//! End-to-end pipeline tests against the in-memory store doubles.

use axon_embed::Embedder;
use axon_services::Registry;
use axon_test_utils::{signed_card, MemoryMetadataStore, MemoryVectorIndex};
use axon_types::app::vector::{VectorHit, VectorPayload};
use axon_types::app::wire::{DiscoveryRequest, RegisterCapability, RegisterRequest};
use axon_types::config::RegistryConfig;
use axon_types::error::RegistryError;
use chrono::{Duration, Utc};
use std::sync::Arc;

fn registry() -> (Arc<MemoryMetadataStore>, Arc<MemoryVectorIndex>, Registry) {
    let store = Arc::new(MemoryMetadataStore::new());
    let index = Arc::new(MemoryVectorIndex::new());
    let registry = Registry::new(
        store.clone(),
        index.clone(),
        Arc::new(Embedder::fallback_only()),
        RegistryConfig::default(),
    );
    (store, index, registry)
}

fn capability(id: &str, description: &str) -> RegisterCapability {
    RegisterCapability {
        capability_id: Some(id.into()),
        description: description.into(),
        tags: vec![],
        input_schema: None,
        output_schema: None,
    }
}

fn register_request(did: &str, endpoint: &str, caps: Vec<RegisterCapability>) -> RegisterRequest {
    RegisterRequest {
        did: did.into(),
        name: None,
        endpoint: Some(endpoint.into()),
        wallet_address: None,
        capabilities: caps,
        card: None,
        card_signature: None,
    }
}

fn discovery(query: &str) -> DiscoveryRequest {
    DiscoveryRequest {
        query: query.into(),
        limit: None,
        min_reputation: None,
    }
}

#[tokio::test]
async fn cardless_register_normalizes_endpoint_and_indexes_one_point() {
    let (store, index, registry) = registry();
    let response = registry
        .register(register_request(
            "did:x:a",
            "http://h/",
            vec![capability("echo", "echo")],
        ))
        .await
        .unwrap();
    assert!(response.ok);
    assert_eq!(response.registered, 1);

    let agent = store.agent("did:x:a").unwrap();
    assert_eq!(agent.endpoint, "http://h");
    assert!(agent.public_key.is_none());
    assert_eq!(index.points_for("did:x:a").len(), 1);
    assert_eq!(store.capabilities_for("did:x:a").len(), 1);
}

#[tokio::test]
async fn register_then_discover_roundtrip() {
    let (_store, _index, registry) = registry();
    registry
        .register(register_request(
            "did:x:roundtrip",
            "http://h",
            vec![capability("translate", "translate english to french")],
        ))
        .await
        .unwrap();

    let results = registry
        .discover(discovery("translate english"))
        .await
        .unwrap();
    assert!(results
        .iter()
        .any(|r| r.agent_did == "did:x:roundtrip" && r.capability_id == "translate"));
}

#[tokio::test]
async fn reregister_fully_replaces_capabilities() {
    let (store, index, registry) = registry();
    registry
        .register(register_request(
            "did:x:replace",
            "http://h",
            vec![capability("a", "first"), capability("b", "second")],
        ))
        .await
        .unwrap();
    assert_eq!(index.points_for("did:x:replace").len(), 2);

    registry
        .register(register_request(
            "did:x:replace",
            "http://h",
            vec![capability("c", "third")],
        ))
        .await
        .unwrap();

    let rows = store.capabilities_for("did:x:replace");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].capability_id, "c");
    let points = index.points_for("did:x:replace");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].payload.capability_id, "c");
}

#[tokio::test]
async fn register_counts_match_submission() {
    let (store, index, registry) = registry();
    let caps: Vec<_> = (0..5)
        .map(|i| capability(&format!("cap{i}"), &format!("capability number {i}")))
        .collect();
    let submitted = caps.len();
    registry
        .register(register_request("did:x:counts", "http://h", caps))
        .await
        .unwrap();
    assert_eq!(store.capabilities_for("did:x:counts").len(), submitted);
    assert_eq!(index.points_for("did:x:counts").len(), submitted);
}

#[tokio::test]
async fn wallet_is_preserved_across_walletless_reregister() {
    let (store, _index, registry) = registry();
    let mut req = register_request("did:x:wallet", "http://h", vec![capability("a", "first")]);
    req.wallet_address = Some("0x52908400098527886E0F7030069857D2E4169EE7".into());
    registry.register(req).await.unwrap();
    assert_eq!(
        store.agent("did:x:wallet").unwrap().wallet_address.as_deref(),
        Some("0x52908400098527886e0f7030069857d2e4169ee7")
    );

    registry
        .register(register_request(
            "did:x:wallet",
            "http://h",
            vec![capability("a", "first")],
        ))
        .await
        .unwrap();
    assert_eq!(
        store.agent("did:x:wallet").unwrap().wallet_address.as_deref(),
        Some("0x52908400098527886e0f7030069857d2e4169ee7")
    );
}

#[tokio::test]
async fn signed_register_happy_path() {
    let (store, index, registry) = registry();
    let (card, signature, _key) = signed_card(
        "did:x:signed",
        "http://h",
        &[("summarize", "summarize documents")],
    );
    let mut req = register_request(
        "did:x:signed",
        "http://h/",
        vec![capability("summarize", "summarize documents")],
    );
    req.card = Some(card.clone());
    req.card_signature = Some(signature);
    registry.register(req).await.unwrap();

    let agent = store.agent("did:x:signed").unwrap();
    assert_eq!(agent.public_key.as_deref(), Some(card.public_key.as_str()));
    assert!(agent.card_signature.is_some());
    assert!(agent.card_raw.is_some());
    assert_eq!(index.points_for("did:x:signed").len(), 1);
}

#[tokio::test]
async fn mismatched_card_did_rejects_without_writing() {
    let (store, index, registry) = registry();
    let (card, signature, _key) = signed_card("did:x:b", "http://h", &[("echo", "echo")]);
    let mut req = register_request("did:x:a", "http://h", vec![capability("echo", "echo")]);
    req.card = Some(card);
    req.card_signature = Some(signature);

    let err = registry.register(req).await.unwrap_err();
    assert!(matches!(err, RegistryError::BadRequest(_)));
    assert!(store.agent("did:x:a").is_none());
    assert_eq!(index.point_count(), 0);
}

#[tokio::test]
async fn tampered_card_rejects_as_unauthorized() {
    let (store, index, registry) = registry();
    let (mut card, signature, _key) =
        signed_card("did:x:tamper", "http://h", &[("echo", "echo")]);
    // Mutate after signing.
    card.capabilities[0].description = "echo everything".into();
    let mut req = register_request("did:x:tamper", "http://h", vec![capability("echo", "echo")]);
    req.card = Some(card);
    req.card_signature = Some(signature);

    let err = registry.register(req).await.unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized(_)));
    assert!(store.agent("did:x:tamper").is_none());
    assert_eq!(index.point_count(), 0);
}

#[tokio::test]
async fn undeclared_capability_rejects_when_card_present() {
    let (_store, _index, registry) = registry();
    let (card, signature, _key) = signed_card("did:x:extra", "http://h", &[("echo", "echo")]);
    let mut req = register_request(
        "did:x:extra",
        "http://h",
        vec![capability("echo", "echo"), capability("rogue", "undeclared")],
    );
    req.card = Some(card);
    req.card_signature = Some(signature);

    let err = registry.register(req).await.unwrap_err();
    assert!(matches!(err, RegistryError::BadRequest(_)));
}

#[tokio::test]
async fn stale_agents_are_filtered_out() {
    let (store, _index, registry) = registry();
    registry
        .register(register_request(
            "did:x:stale",
            "http://h",
            vec![capability("echo", "echo service")],
        ))
        .await
        .unwrap();
    // Heartbeat three TTLs ago with full availability.
    store.set_agent_signals(
        "did:x:stale",
        0.9,
        1.0,
        Some(Utc::now() - Duration::milliseconds(3 * 60_000)),
    );

    let results = registry.discover(discovery("echo service")).await.unwrap();
    assert!(results.iter().all(|r| r.agent_did != "did:x:stale"));
}

#[tokio::test]
async fn fresh_heartbeat_contributes_availability_to_the_score() {
    let (store, _index, registry) = registry();
    registry
        .register(register_request(
            "did:x:alive",
            "http://h",
            vec![capability("echo", "echo service")],
        ))
        .await
        .unwrap();
    store.set_agent_signals("did:x:alive", 0.5, 0.8, Some(Utc::now()));

    let results = registry.discover(discovery("echo service")).await.unwrap();
    let hit = results
        .iter()
        .find(|r| r.agent_did == "did:x:alive")
        .unwrap();
    assert_eq!(hit.availability_score, Some(0.8));
    let expected = 0.7 * hit.vector_score + 0.25 * 0.5 + 0.2 * 0.8;
    assert!((hit.score - expected).abs() < 1e-9);
}

#[tokio::test]
async fn hybrid_merge_dedupes_and_keeps_the_vector_score() {
    let (_store, index, registry) = registry();
    registry
        .register(register_request(
            "a",
            "http://a",
            vec![capability("cap1", "needle in text")],
        ))
        .await
        .unwrap();
    registry
        .register(register_request(
            "b",
            "http://b",
            vec![capability("cap2", "another needle")],
        ))
        .await
        .unwrap();
    index.set_canned_hits(vec![VectorHit {
        score: 0.9,
        payload: VectorPayload {
            agent_did: "a".into(),
            capability_id: "cap1".into(),
            description: "needle in text".into(),
            tags: vec![],
        },
    }]);

    let results = registry.discover(discovery("needle")).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].agent_did, "a");
    assert_eq!(results[0].vector_score, 0.9);
    assert_eq!(results[1].agent_did, "b");
    assert_eq!(results[1].vector_score, 0.45);
}

#[tokio::test]
async fn discovery_survives_a_vector_index_outage() {
    let (_store, index, registry) = registry();
    registry
        .register(register_request(
            "did:x:outage",
            "http://h",
            vec![capability("echo", "resilient echo")],
        ))
        .await
        .unwrap();
    index.set_search_failure(true);

    let results = registry.discover(discovery("resilient")).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].agent_did, "did:x:outage");
    assert_eq!(results[0].vector_score, 0.45);
}

#[tokio::test]
async fn discovery_results_are_unique_and_sorted() {
    let (store, _index, registry) = registry();
    for i in 0..4 {
        let did = format!("did:x:rank{i}");
        registry
            .register(register_request(
                &did,
                "http://h",
                vec![capability("rank", "ranking fixture")],
            ))
            .await
            .unwrap();
        store.set_agent_signals(&did, 0.2 * i as f64, 0.0, None);
    }

    let results = registry.discover(discovery("ranking fixture")).await.unwrap();
    assert!(!results.is_empty());
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    let mut seen = std::collections::HashSet::new();
    for r in &results {
        assert!(seen.insert((r.agent_did.clone(), r.capability_id.clone())));
    }
}

#[tokio::test]
async fn min_reputation_filters_results() {
    let (store, _index, registry) = registry();
    registry
        .register(register_request(
            "did:x:low",
            "http://h",
            vec![capability("echo", "reputation fixture")],
        ))
        .await
        .unwrap();
    store.set_agent_signals("did:x:low", 0.1, 0.0, None);

    let mut req = discovery("reputation fixture");
    req.min_reputation = Some(0.5);
    let results = registry.discover(req).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn reindex_rebuilds_points_for_every_capability() {
    let (_store, index, registry) = registry();
    registry
        .register(register_request(
            "did:x:r1",
            "http://h",
            vec![capability("a", "first"), capability("b", "second")],
        ))
        .await
        .unwrap();
    registry
        .register(register_request(
            "did:x:r2",
            "http://h",
            vec![capability("c", "third")],
        ))
        .await
        .unwrap();

    let response = registry.reindex().await.unwrap();
    assert!(response.ok);
    assert_eq!(response.reindexed, 3);
    assert_eq!(index.points_for("did:x:r1").len(), 2);
    assert_eq!(index.points_for("did:x:r2").len(), 1);
}

#[tokio::test]
async fn capability_schema_lookup_and_miss() {
    let (_store, _index, registry) = registry();
    let mut req = register_request("did:x:schema", "http://h", vec![]);
    req.capabilities = vec![RegisterCapability {
        capability_id: Some("convert".into()),
        description: "convert files".into(),
        tags: vec![],
        input_schema: None,
        output_schema: Some(serde_json::json!({"type": "object"})),
    }];
    registry.register(req).await.unwrap();

    let found = registry.capability_schema("convert").await.unwrap();
    assert_eq!(
        found.output_schema,
        Some(serde_json::json!({"type": "object"}))
    );

    let missing = registry.capability_schema("nope").await.unwrap_err();
    assert!(matches!(missing, RegistryError::NotFound(_)));
}

#[tokio::test]
async fn health_reflects_store_failures() {
    let (store, _index, registry) = registry();
    assert!(registry.health().await.is_ok());
    store.set_ping_failure(true);
    assert!(matches!(
        registry.health().await.unwrap_err(),
        RegistryError::Unhealthy(_)
    ));
}

#[tokio::test]
async fn missing_endpoint_is_rejected() {
    let (_store, _index, registry) = registry();
    let mut req = register_request("did:x:noend", "http://h", vec![capability("e", "echo")]);
    req.endpoint = None;
    let err = registry.register(req).await.unwrap_err();
    assert!(matches!(err, RegistryError::BadRequest(_)));
}
