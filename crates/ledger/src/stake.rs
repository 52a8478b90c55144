//! Materializing stake from the utxo and the delegation maps.

use std::collections::BTreeMap;

use stela_core::{Addr, Coin, KeyHash};

use crate::delegation::{DState, PState};
use crate::utxo::UTxO;

/// Stake per credential: coin at key addresses, coin at pointer addresses
/// that resolve, and reward balances, restricted to credentials that are
/// registered and delegated to a registered pool. Everything else is
/// inactive stake and drops out of the denominator.
pub fn stake_distribution(utxo: &UTxO, ds: &DState, ps: &PState) -> BTreeMap<KeyHash, Coin> {
    let mut buckets: BTreeMap<KeyHash, Coin> = BTreeMap::new();

    for (_, out) in utxo.iter() {
        match out.addr {
            Addr::Key { stake, .. } => {
                *buckets.entry(stake).or_insert(0) += out.coin;
            }
            Addr::Ptr(ptr) => {
                if let Some(stake) = ds.ptrs.get(&ptr) {
                    *buckets.entry(*stake).or_insert(0) += out.coin;
                }
            }
        }
    }

    for (account, balance) in &ds.rewards {
        *buckets.entry(account.0).or_insert(0) += balance;
    }

    buckets.retain(|stake, _| {
        ds.stake_keys.contains_key(stake)
            && ds
                .delegations
                .get(stake)
                .map(|pool| ps.pools.contains_key(pool))
                .unwrap_or(false)
    });

    buckets
}

/// Total stake delegated to one pool.
pub fn pool_stake(
    pool: &KeyHash,
    delegations: &BTreeMap<KeyHash, KeyHash>,
    stake: &BTreeMap<KeyHash, Coin>,
) -> Coin {
    stake
        .iter()
        .filter(|(credential, _)| delegations.get(*credential) == Some(pool))
        .map(|(_, coin)| *coin)
        .sum()
}
