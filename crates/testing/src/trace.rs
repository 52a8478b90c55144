//! Random valid-trace machinery for the property tests.
//!
//! A trace is a sequence of abstract actions. The interpreter turns each
//! action into a fully valid transaction against the current state (funding
//! it from the utxo, computing deposits and refunds, and signing with exactly
//! the required witnesses), or skips the action when the state cannot support
//! it. Tests apply the result and check the reachable-state invariants after
//! every step.

use proptest::prelude::*;
use std::collections::BTreeSet;

use stela_core::{Addr, Cert, Coin, Epoch, RewardAcnt, Slot, Tx, TxBody, TxOut};
use stela_ledger::{validate, LedgerState};

use crate::builders::{key_addr, make_tx, pool_params};
use crate::keys;

#[derive(Debug, Clone)]
pub enum Action {
    Transfer {
        to_payment: u8,
        to_stake: u8,
        amount: u64,
    },
    Register {
        key: u8,
    },
    Deregister {
        key: u8,
    },
    /// Register and deregister the same fresh key inside one body; the
    /// deposit and its undecayed refund must cancel.
    Churn {
        key: u8,
    },
    Delegate {
        key: u8,
        pool: u8,
    },
    RegisterPool {
        pool: u8,
    },
    RetirePool {
        pool: u8,
        ahead: u8,
    },
}

pub fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..4, 0u8..4, 1u64..300).prop_map(|(to_payment, to_stake, amount)| {
            Action::Transfer {
                to_payment,
                to_stake,
                amount,
            }
        }),
        (0u8..4).prop_map(|key| Action::Register { key }),
        (0u8..4).prop_map(|key| Action::Deregister { key }),
        (0u8..4).prop_map(|key| Action::Churn { key }),
        (0u8..4, 10u8..12).prop_map(|(key, pool)| Action::Delegate { key, pool }),
        (10u8..12).prop_map(|pool| Action::RegisterPool { pool }),
        (10u8..12, 0u8..3).prop_map(|(pool, ahead)| Action::RetirePool { pool, ahead }),
    ]
}

/// Interpret one action against the state, producing a transaction the
/// validators will accept, or `None` when the action is impossible right now.
pub fn step(state: &LedgerState, slot: Slot, action: &Action) -> Option<Tx> {
    let pp = &state.pparams;

    // fund from the largest output held by a fixture payment key
    let (input, funding) = state
        .utxo_state
        .utxo
        .iter()
        .filter(|(_, out)| matches!(out.addr, Addr::Key { payment, .. } if keys::seed_of(&payment).is_some()))
        .max_by_key(|(_, out)| out.coin)
        .map(|(input, out)| (*input, *out))?;

    let mut certs = vec![];
    let mut transfer: Option<TxOut> = None;

    match action {
        Action::Transfer {
            to_payment,
            to_stake,
            amount,
        } => {
            transfer = Some(TxOut::new(key_addr(*to_payment, *to_stake), *amount));
        }
        Action::Register { key } => {
            if state.dstate.is_registered(&keys::hash(*key)) {
                return None;
            }

            certs.push(Cert::RegKey(keys::hash(*key)));
        }
        Action::Deregister { key } => {
            let hash = keys::hash(*key);

            if !state.dstate.is_registered(&hash) {
                return None;
            }

            // deregistering a funded account would destroy its balance;
            // real wallets drain it first, so the trace only removes
            // empty accounts
            if state.dstate.rewards.get(&RewardAcnt(hash)).copied() != Some(0) {
                return None;
            }

            certs.push(Cert::DeRegKey(hash));
        }
        Action::Churn { key } => {
            let hash = keys::hash(*key);

            if state.dstate.is_registered(&hash) {
                return None;
            }

            certs.push(Cert::RegKey(hash));
            certs.push(Cert::DeRegKey(hash));
        }
        Action::Delegate { key, pool } => {
            if !state.dstate.is_registered(&keys::hash(*key)) {
                return None;
            }

            certs.push(Cert::Delegate {
                delegator: keys::hash(*key),
                pool: keys::hash(*pool),
            });
        }
        Action::RegisterPool { pool } => {
            certs.push(Cert::RegPool(pool_params(*pool)));
        }
        Action::RetirePool { pool, ahead } => {
            if !state.pstate.is_registered(&keys::hash(*pool)) {
                return None;
            }

            certs.push(Cert::RetirePool {
                pool: keys::hash(*pool),
                epoch: pp.epoch_of(slot) + 1 + *ahead as Epoch,
            });
        }
    }

    // constant fee floor in the trace parameters (the size coefficient is
    // zero), so the fee does not feed back into the serialized size
    let fee = pp.min_fee_b;

    let deposits = validate::deposits(pp, &state.pstate.pools, &certs);

    let mut body = TxBody {
        inputs: BTreeSet::from([input]),
        certs,
        fee,
        ttl: slot + 50,
        ..Default::default()
    };

    let refunds = validate::key_refunds(pp, &state.dstate.stake_keys, &body);

    let available = funding.coin + refunds;
    let spent = fee + deposits + transfer.as_ref().map(|out| out.coin).unwrap_or(0);

    if available < spent {
        return None;
    }

    if let Some(out) = transfer {
        body.outputs.push(out);
    }

    body.outputs.push(TxOut::new(funding.addr, available - spent));

    let needed = validate::wits_needed(
        &state.utxo_state.utxo,
        &body,
        &state.dstate.genesis_delegates,
    );

    let seeds: Vec<u8> = needed
        .iter()
        .map(keys::seed_of)
        .collect::<Option<Vec<u8>>>()?;

    Some(make_tx(body, &seeds))
}

/// Pool deposits that the retirement sweep for `epoch` will fail to release
/// because the reward account is gone.
pub fn withheld_at(state: &LedgerState, epoch: Epoch) -> Coin {
    state
        .pstate
        .retiring
        .iter()
        .filter(|(_, scheduled)| **scheduled == epoch)
        .filter_map(|(pool, _)| state.pstate.params.get(pool))
        .filter(|params| !state.dstate.rewards.contains_key(&params.reward_account))
        .count() as Coin
        * state.pparams.pool_deposit
}

/// The reachable-state invariants, checked after every trace step. `withheld`
/// is the total of deposits stranded by sweeps whose reward account had
/// disappeared (they stay in the pot on top of the live obligations).
pub fn assert_invariants(state: &LedgerState, expected_circulation: Coin, withheld: Coin) {
    assert_eq!(
        state.circulation(),
        expected_circulation,
        "money leaked or appeared"
    );

    assert_eq!(
        state.dstate.rewards.len(),
        state.dstate.stake_keys.len(),
        "reward accounts out of sync with registrations"
    );

    for account in state.dstate.rewards.keys() {
        assert!(state.dstate.stake_keys.contains_key(&account.0));
    }

    for (ptr, key) in &state.dstate.ptrs {
        assert!(ptr.slot <= state.current_slot, "pointer from the future");
        assert!(
            state.dstate.stake_keys.contains_key(key),
            "dangling pointer"
        );
    }

    for source in state.dstate.delegations.keys() {
        assert!(
            state.dstate.stake_keys.contains_key(source),
            "delegation from an unregistered key"
        );
    }

    for pool in state.pstate.retiring.keys() {
        assert!(state.pstate.pools.contains_key(pool), "retiring unknown pool");
    }

    for pool in state.pstate.pools.keys() {
        assert!(state.pstate.params.contains_key(pool), "pool without params");
    }

    let obligation = state.pparams.key_deposit * state.dstate.stake_keys.len() as u64
        + state.pparams.pool_deposit * state.pstate.pools.len() as u64;

    assert_eq!(
        state.utxo_state.deposited,
        obligation + withheld,
        "deposit pot does not match the outstanding obligations"
    );
}
