//! Types and machinery shared by all stela crates.
//!
//! Glossary:
//!  - `coin`: an amount in the smallest monetary unit; all arithmetic over
//!    coins is exact integer arithmetic unless a call site explicitly
//!    saturates (refunds).
//!  - `credential`: the hash of a verification key, used as the identity of
//!    stake keys, pool keys and genesis delegates.
//!  - `pointer`: the `(slot, tx index, cert index)` triple assigned when a
//!    registration certificate is committed; outputs can address a stake key
//!    through it instead of embedding the credential.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod codec;
pub mod crypto;
pub mod interval;
pub mod pparams;
pub mod tx;
pub mod validity;

/// An amount in the smallest monetary unit.
pub type Coin = u64;

/// The slot of a block (monotonic chain index).
pub type Slot = u64;

/// The epoch of a slot.
pub type Epoch = u64;

/// The order of a tx within its slot.
pub type TxIx = u32;

/// The order of a certificate within its tx.
pub type CertIx = u32;

/// Hash of a verification key (stake key, pool key or genesis delegate).
pub type KeyHash = pallas_crypto::hash::Hash<28>;

/// Hash of a transaction body.
pub type TxId = pallas_crypto::hash::Hash<32>;

pub use crypto::{body_hash, key_hash, verify, Sig, VKey};
pub use interval::{IntervalError, NonNegInterval, UnitInterval};
pub use pparams::PParams;
pub use tx::{
    Addr, Cert, ExtraEntropy, PoolParams, RewardAcnt, Tx, TxBody, TxIn, TxOut, VKeyWitness,
};
pub use validity::{Validity, ValidationError};

/// Certificate pointer assigned at commit time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Ptr {
    pub slot: Slot,
    pub tx_ix: TxIx,
    pub cert_ix: CertIx,
}

impl Ptr {
    pub fn new(slot: Slot, tx_ix: TxIx, cert_ix: CertIx) -> Self {
        Self {
            slot,
            tx_ix,
            cert_ix,
        }
    }
}

impl Display for Ptr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.slot, self.tx_ix, self.cert_ix)
    }
}
