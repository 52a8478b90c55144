//! The transaction validators.
//!
//! Each predicate returns its own verdict and `validate_tx` folds them
//! through the accumulating monoid, so a rejected transaction reports every
//! rule it broke, not just the first.

use std::collections::{BTreeMap, BTreeSet};

use num_rational::BigRational;

use stela_core::{
    Cert, Coin, Epoch, KeyHash, PParams, RewardAcnt, Slot, Tx, TxBody, ValidationError, Validity,
};

use crate::delegation::{DState, PState};
use crate::math::rpow;
use crate::utxo::{UTxO, UTxOState};
use crate::{floor_int, ratio};

/// Every credential that must witness the body: payment keys of the spent
/// outputs, withdrawal accounts, certificate signers (plus declared owners of
/// a registering pool), and the delegates of any genesis key contributing
/// entropy.
pub fn wits_needed(
    utxo: &UTxO,
    body: &TxBody,
    genesis_delegates: &BTreeMap<KeyHash, KeyHash>,
) -> BTreeSet<KeyHash> {
    let mut needed = BTreeSet::new();

    for input in &body.inputs {
        if let Some(out) = utxo.get(input) {
            if let Some(payment) = out.addr.payment() {
                needed.insert(payment);
            }
        }
    }

    for account in body.withdrawals.keys() {
        needed.insert(account.0);
    }

    for cert in &body.certs {
        needed.insert(cert.signer());

        if let Cert::RegPool(params) = cert {
            needed.extend(params.owners.iter().copied());
        }
    }

    for genesis in body.entropy.keys() {
        if let Some(delegate) = genesis_delegates.get(genesis) {
            needed.insert(*delegate);
        }
    }

    needed
}

/// Deposits the body's certificates take: one key deposit per registration,
/// one pool deposit per pool not already registered (re-registration is a
/// parameter update and charges nothing). Registration state is tracked
/// through the body, the way the certs will apply, so a second registration
/// of the same new pool in one body does not charge twice.
pub fn deposits(pp: &PParams, pools: &BTreeMap<KeyHash, Slot>, certs: &[Cert]) -> Coin {
    let mut pools: BTreeSet<KeyHash> = pools.keys().copied().collect();

    let mut total = 0;

    for cert in certs {
        match cert {
            Cert::RegKey(_) => total += pp.key_deposit,
            Cert::RegPool(params) => {
                if pools.insert(params.operator) {
                    total += pp.pool_deposit;
                }
            }
            _ => {}
        }
    }

    total
}

/// The decayed key-deposit refund for a registration of the given age:
/// `d * (m + (1 - m) * (1 - λ)^Δ)`, floored to a coin.
pub fn decayed_refund(pp: &PParams, age: u64) -> Coin {
    let deposit = ratio!(pp.key_deposit);
    let floor: BigRational = pp.key_min_refund.to_ratio();
    let lambda = pp.key_decay_rate.to_ratio();

    let retained = rpow(&(ratio!(1) - lambda), age);
    let refund = deposit * (floor.clone() + (ratio!(1) - floor) * retained);

    floor_int!(refund, u64)
}

/// Refunds the body's deregistrations claim. The age of each registration is
/// measured at the transaction's ttl, and registrations are tracked through
/// the body: a key registered by an earlier cert in the same body held its
/// deposit for no time at all, so deregistering it refunds the deposit
/// undecayed.
pub fn key_refunds(pp: &PParams, stake_keys: &BTreeMap<KeyHash, Slot>, body: &TxBody) -> Coin {
    let mut keys: BTreeMap<KeyHash, Slot> = stake_keys.clone();

    let mut total = 0;

    for cert in &body.certs {
        match cert {
            Cert::RegKey(key) => {
                // registered at the ttl, so a same-body deregistration sees
                // age zero
                keys.insert(*key, body.ttl);
            }
            Cert::DeRegKey(key) => {
                if let Some(registered) = keys.remove(key) {
                    total += decayed_refund(pp, body.ttl.saturating_sub(registered));
                }
            }
            _ => {}
        }
    }

    total
}

/// `sum(outputs) + fee + deposits`.
pub fn produced(pp: &PParams, pools: &BTreeMap<KeyHash, Slot>, body: &TxBody) -> Coin {
    let outputs: Coin = body.outputs.iter().map(|out| out.coin).sum();

    outputs + body.fee + deposits(pp, pools, &body.certs)
}

/// `sum(inputs) + refunds + sum(withdrawals)`.
pub fn consumed(
    pp: &PParams,
    utxo: &UTxO,
    stake_keys: &BTreeMap<KeyHash, Slot>,
    body: &TxBody,
) -> Coin {
    let withdrawals: Coin = body.withdrawals.values().sum();

    utxo.resolved_balance(&body.inputs) + key_refunds(pp, stake_keys, body) + withdrawals
}

pub fn valid_inputs(utxo: &UTxO, body: &TxBody) -> Validity {
    Validity::require(
        body.inputs.iter().all(|input| utxo.contains(input)),
        ValidationError::BadInputs,
    )
}

pub fn current(body: &TxBody, slot: Slot) -> Validity {
    Validity::require(
        body.ttl >= slot,
        ValidationError::Expired(body.ttl, slot),
    )
}

/// Inputs are what make two otherwise-identical bodies distinct, so an empty
/// input set would be replayable.
pub fn valid_no_replay(body: &TxBody) -> Validity {
    Validity::require(!body.inputs.is_empty(), ValidationError::InputSetEmpty)
}

pub fn valid_fee(pp: &PParams, body: &TxBody) -> Validity {
    let needed = pp.min_fee(body.size());

    Validity::require(
        body.fee >= needed,
        ValidationError::FeeTooSmall(needed, body.fee),
    )
}

pub fn preserve_balance(
    pp: &PParams,
    utxo: &UTxO,
    stake_keys: &BTreeMap<KeyHash, Slot>,
    pools: &BTreeMap<KeyHash, Slot>,
    body: &TxBody,
) -> Validity {
    let consumed = consumed(pp, utxo, stake_keys, body);
    let produced = produced(pp, pools, body);

    Validity::require(
        consumed == produced,
        ValidationError::ValueNotConserved(consumed, produced),
    )
}

/// Withdrawals must drain an account exactly; partial withdrawals are not a
/// thing.
pub fn correct_withdrawals(rewards: &BTreeMap<RewardAcnt, Coin>, body: &TxBody) -> Validity {
    Validity::require(
        body.withdrawals
            .iter()
            .all(|(account, amount)| rewards.get(account) == Some(amount)),
        ValidationError::IncorrectRewards,
    )
}

pub fn verified_wits(tx: &Tx) -> Validity {
    let id = tx.body.id();

    Validity::require(
        tx.witnesses.iter().all(|wit| wit.verifies(id.as_ref())),
        ValidationError::InvalidWitness,
    )
}

pub fn enough_wits(needed: &BTreeSet<KeyHash>, signers: &BTreeSet<KeyHash>) -> Validity {
    Validity::require(
        needed.is_subset(signers),
        ValidationError::MissingWitnesses,
    )
}

pub fn no_unneeded_wits(needed: &BTreeSet<KeyHash>, signers: &BTreeSet<KeyHash>) -> Validity {
    Validity::require(
        signers.is_subset(needed),
        ValidationError::UnneededWitnesses,
    )
}

/// Certificate preconditions, checked in application order against a scratch
/// view of the registration sets so that sequences within one body (register
/// then delegate, register then re-register) are judged the way they will
/// apply.
pub fn valid_certs(ds: &DState, ps: &PState, body: &TxBody, current_epoch: Epoch) -> Validity {
    let mut keys: BTreeSet<KeyHash> = ds.stake_keys.keys().copied().collect();
    let mut pools: BTreeSet<KeyHash> = ps.pools.keys().copied().collect();

    let mut verdict = Validity::valid();

    for cert in &body.certs {
        let check = match cert {
            Cert::RegKey(key) => Validity::require(
                keys.insert(*key),
                ValidationError::StakeKeyAlreadyRegistered,
            ),
            Cert::DeRegKey(key) => Validity::require(
                keys.remove(key),
                ValidationError::StakeKeyNotRegistered,
            ),
            Cert::Delegate { delegator, .. } => Validity::require(
                keys.contains(delegator),
                ValidationError::StakeDelegationImpossible,
            ),
            Cert::RegPool(params) => {
                pools.insert(params.operator);
                Validity::valid()
            }
            Cert::RetirePool { pool, epoch } => {
                if !pools.contains(pool) {
                    Validity::invalid(ValidationError::StakePoolNotRegisteredOnKey)
                } else {
                    Validity::require(
                        *epoch > current_epoch,
                        ValidationError::RetirementCertExpired(*epoch, current_epoch),
                    )
                }
            }
        };

        verdict = verdict.combine(check);
    }

    verdict
}

/// All predicates folded into one verdict.
pub fn validate_tx(
    slot: Slot,
    pp: &PParams,
    utxo_state: &UTxOState,
    ds: &DState,
    ps: &PState,
    tx: &Tx,
) -> Validity {
    let utxo = &utxo_state.utxo;

    let needed = wits_needed(utxo, &tx.body, &ds.genesis_delegates);
    let signers: BTreeSet<KeyHash> = tx.witnesses.iter().map(|wit| wit.key_hash()).collect();

    [
        valid_inputs(utxo, &tx.body),
        current(&tx.body, slot),
        valid_no_replay(&tx.body),
        valid_fee(pp, &tx.body),
        preserve_balance(pp, utxo, &ds.stake_keys, &ps.pools, &tx.body),
        correct_withdrawals(&ds.rewards, &tx.body),
        verified_wits(tx),
        enough_wits(&needed, &signers),
        no_unneeded_wits(&needed, &signers),
        valid_certs(ds, ps, &tx.body, pp.epoch_of(slot)),
    ]
    .into_iter()
    .collect()
}
