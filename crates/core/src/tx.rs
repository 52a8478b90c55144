//! The transaction model.
//!
//! Bodies are value types with canonical (ordered) collections so that every
//! derived artifact (the body hash, the serialized size, iteration during
//! validation) is deterministic across nodes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::{
    codec, crypto, Coin, Epoch, KeyHash, Ptr, Sig, Slot, TxId, UnitInterval, VKey,
};

/// Reference to the output of a previous transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TxIn {
    pub tx: TxId,
    pub index: u32,
}

impl TxIn {
    pub fn new(tx: TxId, index: u32) -> Self {
        Self { tx, index }
    }
}

impl Display for TxIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.tx, self.index)
    }
}

/// Output address: either an explicit payment/stake credential pair or a
/// pointer to a committed registration certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Addr {
    Key { payment: KeyHash, stake: KeyHash },
    Ptr(Ptr),
}

impl Addr {
    /// The credential that must witness spending from this address, when the
    /// address carries one.
    pub fn payment(&self) -> Option<KeyHash> {
        match self {
            Addr::Key { payment, .. } => Some(*payment),
            Addr::Ptr(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub addr: Addr,
    pub coin: Coin,
}

impl TxOut {
    pub fn new(addr: Addr, coin: Coin) -> Self {
        Self { addr, coin }
    }
}

/// Account into which delegation rewards accrue, keyed by the stake
/// credential it belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RewardAcnt(pub KeyHash);

impl Display for RewardAcnt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rwd:{}", self.0)
    }
}

/// Declared operating parameters of a stake pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParams {
    pub operator: KeyHash,
    pub pledge: Coin,
    pub cost: Coin,
    pub margin: UnitInterval,
    pub reward_account: RewardAcnt,
    pub owners: BTreeSet<KeyHash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cert {
    RegKey(KeyHash),
    DeRegKey(KeyHash),
    Delegate { delegator: KeyHash, pool: KeyHash },
    RegPool(PoolParams),
    RetirePool { pool: KeyHash, epoch: Epoch },
}

impl Cert {
    /// The credential that must sign the transaction carrying this
    /// certificate.
    pub fn signer(&self) -> KeyHash {
        match self {
            Cert::RegKey(k) => *k,
            Cert::DeRegKey(k) => *k,
            Cert::Delegate { delegator, .. } => *delegator,
            Cert::RegPool(params) => params.operator,
            Cert::RetirePool { pool, .. } => *pool,
        }
    }
}

/// Extra-entropy contribution, keyed by the genesis key hash that vouches
/// for it.
pub type ExtraEntropy = BTreeMap<KeyHash, Vec<u8>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxBody {
    pub inputs: BTreeSet<TxIn>,
    pub outputs: Vec<TxOut>,
    pub certs: Vec<Cert>,
    pub withdrawals: BTreeMap<RewardAcnt, Coin>,
    pub fee: Coin,
    pub ttl: Slot,
    pub entropy: ExtraEntropy,
}

impl TxBody {
    pub fn bytes(&self) -> Vec<u8> {
        codec::body_bytes(self)
    }

    /// Hash of the serialized body; doubles as the id under which the body's
    /// outputs enter the utxo.
    pub fn id(&self) -> TxId {
        crypto::body_hash(&self.bytes())
    }

    /// Serialized length, the `size(tx)` of the fee floor.
    pub fn size(&self) -> u64 {
        self.bytes().len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VKeyWitness {
    pub vkey: VKey,
    pub signature: Sig,
}

impl VKeyWitness {
    pub fn key_hash(&self) -> KeyHash {
        crypto::key_hash(&self.vkey)
    }

    pub fn verifies(&self, message: &[u8]) -> bool {
        crypto::verify(&self.vkey, message, &self.signature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub body: TxBody,
    pub witnesses: Vec<VKeyWitness>,
}

impl Tx {
    pub fn new(body: TxBody, witnesses: Vec<VKeyWitness>) -> Self {
        Self { body, witnesses }
    }
}
