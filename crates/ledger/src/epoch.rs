//! Epoch-level state: account pots, rolling snapshots, the retirement sweep
//! and the application of reward updates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use stela_core::{Coin, Epoch, KeyHash, PParams, PoolParams, RewardAcnt};

use crate::delegation;
use crate::stake::stake_distribution;
use crate::transition::LedgerState;

/// Blocks produced per pool in one epoch.
pub type BlocksMade = BTreeMap<KeyHash, u64>;

/// The chain-level money pots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Accounts {
    pub treasury: Coin,
    pub reserves: Coin,
}

/// A frozen view of stake, delegations and pool parameters, taken at an
/// epoch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapShot {
    pub stake: BTreeMap<KeyHash, Coin>,
    pub delegations: BTreeMap<KeyHash, KeyHash>,
    pub pool_params: BTreeMap<KeyHash, PoolParams>,
}

/// The three rolling snapshots plus the fee pot frozen alongside `go`.
/// `mark` is the most recent, `go` feeds the reward engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapShots {
    pub mark: SnapShot,
    pub set: SnapShot,
    pub go: SnapShot,
    pub fee_ss: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochState {
    pub accounts: Accounts,
    pub pparams: PParams,
    pub snapshots: SnapShots,
    pub ledger: LedgerState,
}

/// Value movement decided by the reward engine. Positive deltas add to their
/// pot; reserves and fees typically shrink.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardUpdate {
    pub delta_treasury: i64,
    pub delta_reserves: i64,
    pub rewards: BTreeMap<RewardAcnt, Coin>,
    pub delta_fees: i64,
}

impl RewardUpdate {
    /// Net flow across the four pots. Zero exactly when every minted and
    /// collected unit lands in a pot, which is how the conformance scenarios
    /// state conservation (reward balances enter the update from zero).
    pub fn net_flow(&self) -> i128 {
        let rewards: i128 = self.rewards.values().map(|c| *c as i128).sum();

        self.delta_treasury as i128
            + self.delta_reserves as i128
            + self.delta_fees as i128
            + rewards
    }
}

/// Freeze the live stake distribution, delegations and pool parameters.
pub fn take_snapshot(ledger: &LedgerState) -> SnapShot {
    SnapShot {
        stake: stake_distribution(&ledger.utxo_state.utxo, &ledger.dstate, &ledger.pstate),
        delegations: ledger.dstate.delegations.clone(),
        pool_params: ledger.pstate.params.clone(),
    }
}

/// Roll the snapshots at an epoch boundary: a fresh `mark`, the old `mark`
/// becomes `set`, the old `set` becomes `go`, and the fee pot is frozen for
/// the reward computation.
pub fn rotate_snapshots(es: &EpochState) -> SnapShots {
    SnapShots {
        mark: take_snapshot(&es.ledger),
        set: es.snapshots.mark.clone(),
        go: es.snapshots.set.clone(),
        fee_ss: es.ledger.utxo_state.fees,
    }
}

/// Epoch-boundary retirement: every pool scheduled for this epoch leaves the
/// registration maps and its deposit is released to its reward account. A
/// deposit whose reward account is gone stays in the pot; there is nowhere
/// else for it to go from inside the ledger state.
pub fn retire_pools(state: &LedgerState, epoch: Epoch) -> LedgerState {
    let mut next = state.clone();

    let swept = delegation::sweep_retirements(&mut next.pstate, epoch);

    for (pool, params) in swept {
        match next.dstate.rewards.get_mut(&params.reward_account) {
            Some(balance) => {
                *balance += next.pparams.pool_deposit;
                next.utxo_state.deposited -= next.pparams.pool_deposit;
            }
            None => {
                warn!(pool = %pool, "retired pool's reward account is unregistered, deposit withheld");
            }
        }
    }

    next
}

/// Commit a reward update: shift the pots and let the update's balances
/// shadow the prior ones. Accounts that vanished since the update was built
/// are skipped; their share already went to the treasury at construction.
pub fn apply_reward_update(ru: &RewardUpdate, es: &EpochState) -> EpochState {
    let mut next = es.clone();

    next.accounts.treasury = shift(next.accounts.treasury, ru.delta_treasury);
    next.accounts.reserves = shift(next.accounts.reserves, ru.delta_reserves);
    next.ledger.utxo_state.fees = shift(next.ledger.utxo_state.fees, ru.delta_fees);

    for (account, balance) in &ru.rewards {
        match next.ledger.dstate.rewards.get_mut(account) {
            Some(prev) => *prev = *balance,
            None => warn!(account = %account, "reward account dropped before the update applied"),
        }
    }

    debug!(
        delta_treasury = ru.delta_treasury,
        delta_reserves = ru.delta_reserves,
        delta_fees = ru.delta_fees,
        accounts = ru.rewards.len(),
        "applied reward update"
    );

    next
}

fn shift(pot: Coin, delta: i64) -> Coin {
    if delta >= 0 {
        pot + delta as Coin
    } else {
        pot - delta.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_pots_in_both_directions() {
        assert_eq!(shift(10, 5), 15);
        assert_eq!(shift(10, -7), 3);
        assert_eq!(shift(10, 0), 10);
    }

    #[test]
    fn net_flow_balances_a_conserving_update() {
        let mut rewards = BTreeMap::new();
        rewards.insert(RewardAcnt(pallas_crypto::hash::Hasher::<224>::hash(&[1])), 9);

        let ru = RewardUpdate {
            delta_treasury: 3,
            delta_reserves: -10,
            rewards,
            delta_fees: -2,
        };

        assert_eq!(ru.net_flow(), 0);
    }
}
