//! The narrow seam to the cryptographic collaborators.
//!
//! The engine never implements primitives itself: hashing is blake2b through
//! the pallas hasher and signatures are ed25519. Everything above this module
//! only sees `KeyHash`, `TxId` and a boolean verdict.

use pallas_crypto::hash::Hasher;

use crate::{KeyHash, TxId};

pub type VKey = ed25519_dalek::VerifyingKey;
pub type Sig = ed25519_dalek::Signature;

/// Blake2b-224 digest of a verification key.
pub fn key_hash(vkey: &VKey) -> KeyHash {
    Hasher::<224>::hash(vkey.as_bytes())
}

/// Blake2b-256 digest of a serialized transaction body.
pub fn body_hash(bytes: &[u8]) -> TxId {
    Hasher::<256>::hash(bytes)
}

/// Check a witness signature against the body hash.
pub fn verify(vkey: &VKey, message: &[u8], signature: &Sig) -> bool {
    vkey.verify_strict(message, signature).is_ok()
}
