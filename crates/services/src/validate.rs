// Path: crates/services/src/validate.rs
//! Schema validation for the write and discovery payloads.
//!
//! Validation failures are collected per field and surfaced together in the
//! `validation` array of the error envelope, rather than stopping at the
//! first offense.

use axon_types::app::wire::{DiscoveryRequest, RegisterRequest};
use axon_types::error::{RegistryError, ValidationIssue};

pub const MAX_CAPABILITIES: usize = 25;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_CHARS: usize = 64;
pub const MAX_DISCOVERY_LIMIT: u32 = 50;
pub const DEFAULT_DISCOVERY_LIMIT: u32 = 5;

/// Checks the register body's shape constraints. Card semantics (signature,
/// did/endpoint match, capability membership) are enforced by the
/// registration pipeline after this passes.
pub fn validate_register(req: &RegisterRequest) -> Result<(), RegistryError> {
    let mut issues = Vec::new();

    if req.did.trim().is_empty() {
        issues.push(ValidationIssue::new("did", "must be a non-empty string"));
    }

    if let Some(wallet) = &req.wallet_address {
        if !is_wallet_address(wallet) {
            issues.push(ValidationIssue::new(
                "walletAddress",
                "must match ^0x[0-9a-fA-F]{40}$",
            ));
        }
    }

    if req.capabilities.is_empty() {
        issues.push(ValidationIssue::new(
            "capabilities",
            "at least one capability is required",
        ));
    } else if req.capabilities.len() > MAX_CAPABILITIES {
        issues.push(ValidationIssue::new(
            "capabilities",
            format!("at most {MAX_CAPABILITIES} capabilities are allowed"),
        ));
    }

    for (i, capability) in req.capabilities.iter().enumerate() {
        let chars = capability.description.chars().count();
        if chars == 0 || chars > MAX_DESCRIPTION_CHARS {
            issues.push(ValidationIssue::new(
                format!("capabilities.{i}.description"),
                format!("must be 1..{MAX_DESCRIPTION_CHARS} characters"),
            ));
        }
        if capability.tags.len() > MAX_TAGS {
            issues.push(ValidationIssue::new(
                format!("capabilities.{i}.tags"),
                format!("at most {MAX_TAGS} tags are allowed"),
            ));
        }
        for (j, tag) in capability.tags.iter().enumerate() {
            if tag.chars().count() > MAX_TAG_CHARS {
                issues.push(ValidationIssue::new(
                    format!("capabilities.{i}.tags.{j}"),
                    format!("must be at most {MAX_TAG_CHARS} characters"),
                ));
            }
        }
    }

    if req.card.is_some() != req.card_signature.is_some() {
        issues.push(ValidationIssue::new(
            "card",
            "card and card_signature must be provided together",
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(RegistryError::Validation(issues))
    }
}

/// Checks the discovery body and resolves its defaults. Returns the
/// effective `(limit, min_reputation)`.
pub fn validate_discovery(
    req: &DiscoveryRequest,
    default_min_reputation: f64,
) -> Result<(u32, f64), RegistryError> {
    let mut issues = Vec::new();

    if req.query.trim().is_empty() {
        issues.push(ValidationIssue::new("query", "must be a non-empty string"));
    }

    let limit = req.limit.unwrap_or(DEFAULT_DISCOVERY_LIMIT);
    if limit < 1 || limit > MAX_DISCOVERY_LIMIT {
        issues.push(ValidationIssue::new(
            "limit",
            format!("must be between 1 and {MAX_DISCOVERY_LIMIT}"),
        ));
    }

    let min_reputation = req.min_reputation.unwrap_or(default_min_reputation);
    if !(0.0..=1.0).contains(&min_reputation) {
        issues.push(ValidationIssue::new(
            "minReputation",
            "must be between 0 and 1",
        ));
    }

    if issues.is_empty() {
        Ok((limit, min_reputation))
    } else {
        Err(RegistryError::Validation(issues))
    }
}

/// Lowercased `0x`-prefixed 40-hex wallet address.
pub fn is_wallet_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// A score in `[0, 1]`, used by the reputation and availability updates.
pub fn validate_unit_interval(field: &str, value: f64) -> Result<(), RegistryError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RegistryError::Validation(vec![ValidationIssue::new(
            field,
            "must be between 0 and 1",
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_types::app::wire::RegisterCapability;

    fn base_request() -> RegisterRequest {
        RegisterRequest {
            did: "did:axon:a".into(),
            name: None,
            endpoint: Some("http://h".into()),
            wallet_address: None,
            capabilities: vec![RegisterCapability {
                capability_id: Some("echo".into()),
                description: "echo".into(),
                tags: vec![],
                input_schema: None,
                output_schema: None,
            }],
            card: None,
            card_signature: None,
        }
    }

    #[test]
    fn accepts_a_minimal_request() {
        assert!(validate_register(&base_request()).is_ok());
    }

    #[test]
    fn description_bounds_are_inclusive() {
        let mut req = base_request();
        req.capabilities[0].description = "d".repeat(500);
        assert!(validate_register(&req).is_ok());
        req.capabilities[0].description = "d".repeat(501);
        assert!(validate_register(&req).is_err());
        req.capabilities[0].description = String::new();
        assert!(validate_register(&req).is_err());
    }

    #[test]
    fn wallet_address_shape_is_enforced() {
        assert!(is_wallet_address(
            "0x52908400098527886E0F7030069857D2E4169EE7"
        ));
        assert!(!is_wallet_address("0x123"));
        assert!(!is_wallet_address(
            "0xZZ908400098527886E0F7030069857D2E4169EE7"
        ));
        assert!(!is_wallet_address(
            "52908400098527886E0F7030069857D2E4169EE700"
        ));
    }

    #[test]
    fn card_without_signature_is_rejected() {
        let mut req = base_request();
        let (card, _signature, _key) =
            axon_test_utils::signed_card("did:axon:a", "http://h", &[("echo", "echo")]);
        req.card = Some(card);
        req.card_signature = None;
        assert!(validate_register(&req).is_err());
    }

    #[test]
    fn discovery_limit_bounds() {
        let req = DiscoveryRequest {
            query: "echo".into(),
            limit: Some(50),
            min_reputation: None,
        };
        assert_eq!(validate_discovery(&req, 0.0).unwrap(), (50, 0.0));

        let req = DiscoveryRequest {
            query: "echo".into(),
            limit: Some(51),
            min_reputation: None,
        };
        assert!(validate_discovery(&req, 0.0).is_err());

        let req = DiscoveryRequest {
            query: "echo".into(),
            limit: None,
            min_reputation: Some(0.25),
        };
        assert_eq!(validate_discovery(&req, 0.0).unwrap(), (5, 0.25));
    }
}
