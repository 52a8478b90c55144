//! The reward engine.
//!
//! Consumes the `go` snapshot and the blocks-made map for the epoch that just
//! ended, and produces a [`RewardUpdate`] moving value between reserves,
//! treasury, the fee pot and the reward accounts. Everything is exact
//! rational arithmetic floored to coins at the documented points, so every
//! node derives the identical update.

use std::collections::BTreeMap;

use tracing::debug;

use stela_core::{Coin, RewardAcnt};

use crate::epoch::{BlocksMade, EpochState, RewardUpdate};
use crate::stake::pool_stake;
use crate::{floor_int, ratio};

pub mod formulas;

/// Build the reward update for the epoch whose production is in `blocks`.
///
/// The emitted reward map carries absolute balances (current balance plus the
/// earned share) for the accounts still registered; applying the update
/// shadows whatever balance is there by then. Shares earned by accounts that
/// deregistered since the snapshot flow back to the treasury.
pub fn create_reward_update(blocks: &BlocksMade, es: &EpochState) -> RewardUpdate {
    let pp = &es.pparams;
    let snapshot = &es.snapshots.go;
    let fee_ss = es.snapshots.fee_ss;

    let blocks_total: u64 = blocks.values().sum();

    // monetary expansion, scaled by how much of the expected production
    // actually happened
    let eta = formulas::eta(
        blocks_total,
        pp.active_slot_coeff.to_ratio(),
        pp.slots_per_epoch,
    );

    let delta_r = floor_int!(
        eta * pp.rho.to_ratio() * ratio!(es.accounts.reserves),
        u64
    );

    let total_pot = fee_ss + delta_r;

    let delta_t1 = floor_int!(pp.tau.to_ratio() * ratio!(total_pot), u64);
    let rewards_pot = total_pot - delta_t1;

    let total_stake: u64 = snapshot.stake.values().sum();

    let mut earned: BTreeMap<RewardAcnt, Coin> = BTreeMap::new();

    if total_stake > 0 {
        for (pool, params) in &snapshot.pool_params {
            let Some(pool_blocks) = blocks.get(pool) else {
                continue;
            };

            let stake = pool_stake(pool, &snapshot.delegations, &snapshot.stake);

            if stake == 0 {
                continue;
            }

            let sigma = ratio!(stake, total_stake);

            // owner-controlled stake counts toward the pledge only while the
            // owners delegate to their own pool
            let owner_stake: u64 = params
                .owners
                .iter()
                .filter(|owner| snapshot.delegations.get(*owner) == Some(pool))
                .filter_map(|owner| snapshot.stake.get(owner))
                .sum();

            let cap = if owner_stake < params.pledge {
                // unmet pledge voids the pool's rewards for the epoch
                0
            } else {
                formulas::max_pool(
                    rewards_pot,
                    pp.n_opt,
                    pp.a0.to_ratio(),
                    sigma.clone(),
                    ratio!(params.pledge, total_stake),
                )
            };

            let pool_r = formulas::pool_reward(cap, *pool_blocks, blocks_total, sigma.clone());

            let leader = formulas::leader_reward(
                pool_r,
                params.cost,
                params.margin.to_ratio(),
                ratio!(owner_stake, total_stake),
                sigma.clone(),
            );

            if leader > 0 {
                *earned.entry(params.reward_account).or_insert(0) += leader;
            }

            for (member, delegated_to) in &snapshot.delegations {
                if delegated_to != pool || params.owners.contains(member) {
                    continue;
                }

                let Some(member_stake) = snapshot.stake.get(member) else {
                    continue;
                };

                let share = formulas::member_reward(
                    pool_r,
                    params.cost,
                    params.margin.to_ratio(),
                    ratio!(*member_stake, total_stake),
                    sigma.clone(),
                );

                if share > 0 {
                    *earned.entry(RewardAcnt(*member)).or_insert(0) += share;
                }
            }

            debug!(pool = %pool, stake, pool_r, leader, "computed pool rewards");
        }
    }

    // drop shares of accounts no longer registered; whatever is not
    // distributed returns to the treasury
    let registered = &es.ledger.dstate.rewards;

    let mut distributed: Coin = 0;
    let mut rewards: BTreeMap<RewardAcnt, Coin> = BTreeMap::new();

    for (account, amount) in earned {
        if let Some(balance) = registered.get(&account) {
            distributed += amount;
            rewards.insert(account, balance + amount);
        }
    }

    debug_assert!(distributed <= rewards_pot);
    let delta_t2 = rewards_pot - distributed;

    debug!(
        delta_r,
        delta_t1, delta_t2, distributed, fee_ss, "assembled reward update"
    );

    RewardUpdate {
        delta_treasury: (delta_t1 + delta_t2) as i64,
        delta_reserves: -(delta_r as i64),
        rewards,
        delta_fees: -(fee_ss as i64),
    }
}
