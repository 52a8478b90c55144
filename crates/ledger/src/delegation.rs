//! Delegation and pool state, and the application of certificates.
//!
//! Certificate preconditions are enforced by the validators before a body is
//! applied, so application itself is infallible: each arm only touches the
//! fields its certificate names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use stela_core::{Cert, Coin, Epoch, KeyHash, PoolParams, Ptr, RewardAcnt, Slot};

/// Stake key registrations, reward accounts, delegations and pointers.
///
/// Invariants maintained here:
///  - `rewards` has exactly one account per registered stake key
///  - every pointer resolves to a registered stake key
///  - every delegation source is a registered stake key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DState {
    /// Registered stake keys with their registration slot.
    pub stake_keys: BTreeMap<KeyHash, Slot>,

    /// Reward account balances.
    pub rewards: BTreeMap<RewardAcnt, Coin>,

    /// Stake key to pool delegations.
    pub delegations: BTreeMap<KeyHash, KeyHash>,

    /// Certificate pointers to the stake keys they registered.
    pub ptrs: BTreeMap<Ptr, KeyHash>,

    /// Genesis key hash to delegate key hash.
    pub genesis_delegates: BTreeMap<KeyHash, KeyHash>,
}

impl DState {
    pub fn is_registered(&self, key: &KeyHash) -> bool {
        self.stake_keys.contains_key(key)
    }
}

/// Pool registrations, declared parameters, the retirement schedule and the
/// operational certificate counters.
///
/// Invariant: `params ⊇ pools ⊇ retiring` on their key sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PState {
    /// Registered pools with their first registration slot.
    pub pools: BTreeMap<KeyHash, Slot>,

    /// Declared parameters, surviving until the pool is swept.
    pub params: BTreeMap<KeyHash, PoolParams>,

    /// Pools scheduled to retire, keyed to the retirement epoch.
    pub retiring: BTreeMap<KeyHash, Epoch>,

    /// Per-pool operational certificate counters. Opaque to the rules here;
    /// they exist so hot-key certificates cannot be replayed across
    /// re-registrations, so they survive the retirement sweep.
    pub op_counters: BTreeMap<KeyHash, u64>,
}

impl PState {
    pub fn is_registered(&self, pool: &KeyHash) -> bool {
        self.pools.contains_key(pool)
    }

    pub fn bump_op_counter(&mut self, pool: KeyHash) -> u64 {
        let counter = self.op_counters.entry(pool).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Apply one certificate at its commit pointer.
pub fn apply_cert(ds: &mut DState, ps: &mut PState, cert: &Cert, slot: Slot, ptr: Ptr) {
    match cert {
        Cert::RegKey(key) => {
            debug!(key = %key, %ptr, "registering stake key");

            ds.stake_keys.insert(*key, slot);
            ds.rewards.insert(RewardAcnt(*key), 0);
            ds.ptrs.insert(ptr, *key);
        }
        Cert::DeRegKey(key) => {
            debug!(key = %key, "deregistering stake key");

            ds.stake_keys.remove(key);
            ds.rewards.remove(&RewardAcnt(*key));
            ds.delegations.remove(key);
            ds.ptrs.retain(|_, target| target != key);
        }
        Cert::Delegate { delegator, pool } => {
            debug!(delegator = %delegator, pool = %pool, "delegating stake");

            // no registration check on the target pool: delegating ahead of
            // the pool's registration is allowed
            ds.delegations.insert(*delegator, *pool);
        }
        Cert::RegPool(params) => {
            let pool = params.operator;

            debug!(pool = %pool, "registering pool");

            ps.pools.entry(pool).or_insert(slot);
            ps.params.insert(pool, params.clone());

            // re-registration cancels a pending retirement
            ps.retiring.remove(&pool);
        }
        Cert::RetirePool { pool, epoch } => {
            debug!(pool = %pool, epoch, "scheduling pool retirement");

            ps.retiring.insert(*pool, *epoch);
        }
    }
}

/// Remove every pool whose scheduled retirement epoch is the given one.
/// Returns the swept pools with their parameters.
pub fn sweep_retirements(ps: &mut PState, epoch: Epoch) -> Vec<(KeyHash, PoolParams)> {
    let due: Vec<KeyHash> = ps
        .retiring
        .iter()
        .filter(|(_, scheduled)| **scheduled == epoch)
        .map(|(pool, _)| *pool)
        .collect();

    let mut swept = Vec::with_capacity(due.len());

    for pool in due {
        debug!(pool = %pool, epoch, "retiring pool");

        ps.pools.remove(&pool);
        ps.retiring.remove(&pool);

        if let Some(params) = ps.params.remove(&pool) {
            swept.push((pool, params));
        }
    }

    swept
}
