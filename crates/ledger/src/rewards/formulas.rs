use std::cmp::min;

use crate::{floor_int, ratio};

pub type Ratio = num_rational::BigRational;

/// Maximal rewards for a pool given its relative stake and pledge:
/// `R / (1 + a0) * (σ' + p' * a0 * ((σ' - p' * (z0 - σ') / z0) / z0))`
/// with both ratios capped at the saturation point `z0 = 1 / n_opt`.
pub fn max_pool(
    rewards_pot: u64,
    n_opt: u32,
    a0: Ratio,
    relative_stake: Ratio,
    relative_pledge: Ratio,
) -> u64 {
    let z0 = ratio!(1u32, n_opt);
    let s = min(relative_stake, z0.clone());
    let p = min(relative_pledge, z0.clone());

    // (z0 - σ') / z0
    let op = (&z0 - &s) / &z0;

    // σ' - p' * ((z0 - σ') / z0)
    let op = &s - &p * &op;

    // (σ' - p' * ((z0 - σ') / z0)) / z0
    let op = op / z0;

    // σ' + p' * a0 * (...)
    let op = s + p * &a0 * op;

    let op = ratio!(rewards_pot) / (ratio!(1) + a0) * op;

    floor_int!(op, u64)
}

/// η: produced-to-expected block ratio for the epoch, capped at one. The
/// expectation is `active_slot_coeff * slots_per_epoch`.
pub fn eta(blocks_total: u64, active_slot_coeff: Ratio, slots_per_epoch: u64) -> Ratio {
    let expected = active_slot_coeff * ratio!(slots_per_epoch);

    if expected <= ratio!(0) {
        // degenerate chain constants; every produced block beats expectation
        return if blocks_total > 0 { ratio!(1) } else { ratio!(0) };
    }

    min(ratio!(blocks_total) / expected, ratio!(1))
}

/// Per-pool pot: the reward cap scaled by apparent performance
/// `(n / max(1, N)) / σ`.
pub fn pool_reward(max_pool: u64, pool_blocks: u64, total_blocks: u64, sigma: Ratio) -> u64 {
    if sigma == ratio!(0) {
        return 0;
    }

    let beta = ratio!(pool_blocks, std::cmp::max(total_blocks, 1));

    let out = ratio!(max_pool) * beta / sigma;

    floor_int!(out, u64)
}

/// Leader share: everything up to the declared cost, then the margin plus
/// the owners' proportional share of the rest.
pub fn leader_reward(
    pool_reward: u64,
    cost: u64,
    margin: Ratio,
    sigma_leader: Ratio,
    sigma: Ratio,
) -> u64 {
    if pool_reward <= cost {
        return pool_reward;
    }

    let after_cost = ratio!(pool_reward - cost);

    let share = if sigma == ratio!(0) {
        ratio!(0)
    } else {
        sigma_leader / &sigma
    };

    // m + (1 - m) * σ_leader / σ
    let term = &margin + (ratio!(1) - &margin) * share;

    cost + floor_int!(after_cost * term, u64)
}

/// Member share for a delegator holding `member_stake` (relative to total):
/// `(R_pool - c) * (1 - m) * t / σ`.
pub fn member_reward(
    pool_reward: u64,
    cost: u64,
    margin: Ratio,
    member_stake: Ratio,
    sigma: Ratio,
) -> u64 {
    if pool_reward <= cost || sigma == ratio!(0) {
        return 0;
    }

    let after_cost = ratio!(pool_reward - cost);

    let out = (ratio!(1) - margin) * after_cost * member_stake / sigma;

    floor_int!(out, u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_pool_caps_stake_at_saturation() {
        // a0 = 0 reduces the formula to R * σ'
        let r = 1000;

        let unsaturated = max_pool(r, 10, ratio!(0), ratio!(1, 20), ratio!(1, 20));
        assert_eq!(unsaturated, 50);

        // σ above z0 = 1/10 is clamped to z0
        let saturated = max_pool(r, 10, ratio!(0), ratio!(1, 2), ratio!(1, 2));
        assert_eq!(saturated, 100);
    }

    #[test]
    fn max_pool_rewards_pledge_influence() {
        let r = 1000;

        // full saturation and full pledge: R / (1 + a0) * (z0 + z0 * a0) with
        // a0 = 1/2, z0 = 1/10 -> 1000 / 1.5 * 0.15 = 100
        let pledged = max_pool(r, 10, ratio!(1, 2), ratio!(1, 10), ratio!(1, 10));
        assert_eq!(pledged, 100);

        // same stake, no pledge: 1000 / 1.5 * 0.1 = 66
        let unpledged = max_pool(r, 10, ratio!(1, 2), ratio!(1, 10), ratio!(0));
        assert_eq!(unpledged, 66);

        assert!(pledged > unpledged);
    }

    #[test]
    fn eta_caps_at_one_and_scales_below_expectation() {
        // expectation: 1/2 * 100 = 50 blocks
        assert_eq!(eta(25, ratio!(1, 2), 100), ratio!(1, 2));
        assert_eq!(eta(50, ratio!(1, 2), 100), ratio!(1));
        assert_eq!(eta(80, ratio!(1, 2), 100), ratio!(1));
        assert_eq!(eta(0, ratio!(1, 2), 100), ratio!(0));
    }

    #[test]
    fn pool_reward_scales_the_cap_by_apparent_performance() {
        // σ = 1/4, produced 1 of 2 blocks: performance = (1/2) / (1/4) = 2
        assert_eq!(pool_reward(100, 1, 2, ratio!(1, 4)), 200);

        // exactly proportional production: performance 1
        assert_eq!(pool_reward(100, 1, 4, ratio!(1, 4)), 100);

        assert_eq!(pool_reward(100, 0, 4, ratio!(1, 4)), 0);
        assert_eq!(pool_reward(100, 1, 4, ratio!(0)), 0);
    }

    #[test]
    fn leader_takes_everything_up_to_cost() {
        assert_eq!(leader_reward(30, 50, ratio!(1, 10), ratio!(0), ratio!(1)), 30);
        assert_eq!(leader_reward(50, 50, ratio!(1, 10), ratio!(0), ratio!(1)), 50);
    }

    #[test]
    fn leader_reward_splits_cost_margin_and_owner_share() {
        // pool reward 150, cost 50, margin 1/10, owners hold half the pool:
        // 50 + 100 * (1/10 + 9/10 * 1/2) = 50 + 55 = 105
        let out = leader_reward(150, 50, ratio!(1, 10), ratio!(1, 8), ratio!(1, 4));
        assert_eq!(out, 105);
    }

    #[test]
    fn member_reward_is_proportional_after_cost_and_margin() {
        // pool reward 150, cost 50, margin 1/10, member holds 1/5 of the
        // pool's quarter: 100 * 9/10 * (1/20) / (1/4) = 18
        let out = member_reward(150, 50, ratio!(1, 10), ratio!(1, 20), ratio!(1, 4));
        assert_eq!(out, 18);

        assert_eq!(member_reward(40, 50, ratio!(1, 10), ratio!(1, 20), ratio!(1, 4)), 0);
    }
}
