//! Builders for addresses, transactions and parameter presets.

use ed25519_dalek::Signer;
use std::collections::BTreeSet;

use stela_core::{
    Addr, NonNegInterval, PParams, PoolParams, RewardAcnt, Tx, TxBody, TxOut, UnitInterval,
    VKeyWitness,
};

use crate::keys;

/// Address with the payment and stake credentials of the given seeds.
pub fn key_addr(payment_seed: u8, stake_seed: u8) -> Addr {
    Addr::Key {
        payment: keys::hash(payment_seed),
        stake: keys::hash(stake_seed),
    }
}

pub fn output(payment_seed: u8, stake_seed: u8, coin: u64) -> TxOut {
    TxOut::new(key_addr(payment_seed, stake_seed), coin)
}

/// Sign the body with each seed's fixture key.
pub fn make_tx(body: TxBody, signer_seeds: &[u8]) -> Tx {
    let id = body.id();

    let witnesses = signer_seeds
        .iter()
        .map(|seed| {
            let signer = keys::signing_key(*seed);

            VKeyWitness {
                vkey: signer.verifying_key(),
                signature: signer.sign(id.as_ref()),
            }
        })
        .collect();

    Tx::new(body, witnesses)
}

/// Pool declaration for a fixture operator. The reward account points at the
/// seed-0 stake credential so traces exercise both the released and the
/// withheld deposit paths.
pub fn pool_params(operator_seed: u8) -> PoolParams {
    PoolParams {
        operator: keys::hash(operator_seed),
        pledge: 0,
        cost: 2,
        margin: UnitInterval::ZERO,
        reward_account: RewardAcnt(keys::hash(0)),
        owners: BTreeSet::from([keys::hash(operator_seed)]),
    }
}

/// Parameters used by the trace tests: a constant fee floor of one (so fees
/// do not feed back into the serialized size), modest deposits, full
/// instantaneous refunds.
pub fn trace_pparams() -> PParams {
    PParams {
        min_fee_a: 0,
        min_fee_b: 1,
        key_deposit: 7,
        pool_deposit: 5,
        key_min_refund: UnitInterval::ONE,
        key_decay_rate: UnitInterval::ZERO,
        rho: UnitInterval::new(1, 10).unwrap(),
        tau: UnitInterval::new(1, 5).unwrap(),
        a0: NonNegInterval::new(3, 10).unwrap(),
        n_opt: 3,
        active_slot_coeff: UnitInterval::new(1, 20).unwrap(),
        slots_per_epoch: 50,
    }
}
