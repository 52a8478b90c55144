//! Deterministic ed25519 fixtures, one per single-byte seed.

use ed25519_dalek::SigningKey;

use stela_core::{key_hash, KeyHash, VKey};

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn vkey(seed: u8) -> VKey {
    signing_key(seed).verifying_key()
}

pub fn hash(seed: u8) -> KeyHash {
    key_hash(&vkey(seed))
}

/// Reverse lookup over the fixture universe.
pub fn seed_of(target: &KeyHash) -> Option<u8> {
    (0..=32).find(|seed| hash(*seed) == *target)
}
