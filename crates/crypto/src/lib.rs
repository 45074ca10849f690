// Path: crates/crypto/src/lib.rs
#![forbid(unsafe_code)]

//! Cryptographic operations for the Axon agent registry: Ed25519 detached
//! signatures over the canonical card serialization, with base58 key and
//! signature encodings.

/// Ed25519 card signing and verification.
pub mod sign;

pub use sign::{generate_signing_key, public_key_b58, sign_card, verify_card, verify_detached};
