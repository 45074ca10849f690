// Path: crates/crypto/src/sign/mod.rs
//! Ed25519 detached signatures over the canonical card form.

use axon_types::app::card::AgentCard;
use axon_types::codec::canonicalize_card;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

#[cfg(test)]
mod tests;

/// Verifies a base58 detached Ed25519 signature against a base58 public key
/// and a raw message. Any decode failure or length mismatch is `false`,
/// never an error: a malformed card must read as "not verified".
pub fn verify_detached(public_key_b58: &str, message: &[u8], signature_b58: &str) -> bool {
    let Ok(pk_bytes) = bs58::decode(public_key_b58).into_vec() else {
        return false;
    };
    let Ok(pk_bytes) = <[u8; 32]>::try_from(pk_bytes) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&pk_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = bs58::decode(signature_b58).into_vec() else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(sig_bytes) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);
    verifying_key.verify(message, &signature).is_ok()
}

/// Verifies a card's detached signature over its canonical serialization,
/// using the `publicKey` embedded in the card itself.
pub fn verify_card(card: &AgentCard, signature_b58: &str) -> bool {
    let canonical = canonicalize_card(card);
    verify_detached(&card.public_key, canonical.as_bytes(), signature_b58)
}

/// Signs a card's canonical serialization, returning the base58 detached
/// signature. Used by registration tooling and tests; the registry itself
/// only ever verifies.
pub fn sign_card(card: &AgentCard, key: &SigningKey) -> String {
    let canonical = canonicalize_card(card);
    let signature = key.sign(canonical.as_bytes());
    bs58::encode(signature.to_bytes()).into_string()
}

/// Generates a fresh Ed25519 signing key from the OS RNG.
pub fn generate_signing_key() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Base58 encoding of a verifying key, as carried in `card.publicKey`.
pub fn public_key_b58(key: &VerifyingKey) -> String {
    bs58::encode(key.to_bytes()).into_string()
}
