//! One test per failure mode the engine can report, driven through the
//! public entry point so the accumulated error lists are exactly what a
//! caller would see.

use std::collections::BTreeSet;

use stela_core::{Cert, Tx, TxBody, TxIn, ValidationError};
use stela_ledger::{apply_tx, genesis_state, LedgerState};
use stela_testing::{hash, make_tx, output, pool_params, trace_pparams};

fn genesis_input(index: u32) -> TxIn {
    TxIn::new(TxBody::default().id(), index)
}

fn funded_state() -> LedgerState {
    genesis_state(trace_pparams(), vec![output(1, 1, 1000)])
}

/// A conserved, correctly-signed transfer to build variations from.
fn transfer_body() -> TxBody {
    TxBody {
        inputs: BTreeSet::from([genesis_input(0)]),
        outputs: vec![output(2, 2, 999)],
        fee: 1,
        ttl: 20,
        ..Default::default()
    }
}

#[test]
fn expiry_is_judged_against_the_application_slot() {
    let state = funded_state();
    let tx = make_tx(transfer_body(), &[1]);

    assert!(apply_tx(20, &state, &tx).is_ok());

    let tx = make_tx(transfer_body(), &[1]);

    assert_eq!(
        apply_tx(21, &funded_state(), &tx).expect_err("past the ttl"),
        vec![ValidationError::Expired(20, 21)]
    );
}

#[test]
fn an_empty_input_set_is_never_acceptable() {
    let state = funded_state();

    let body = TxBody {
        outputs: vec![],
        fee: 1,
        ttl: 20,
        ..Default::default()
    };

    // nothing consumed, only the fee produced: both rules report
    assert_eq!(
        apply_tx(1, &state, &make_tx(body, &[])).expect_err("empty inputs"),
        vec![
            ValidationError::InputSetEmpty,
            ValidationError::ValueNotConserved(0, 1),
        ]
    );
}

#[test]
fn missing_and_unneeded_witnesses_are_separate_failures() {
    let state = funded_state();

    assert_eq!(
        apply_tx(1, &state, &make_tx(transfer_body(), &[])).expect_err("unsigned"),
        vec![ValidationError::MissingWitnesses]
    );

    assert_eq!(
        apply_tx(1, &state, &make_tx(transfer_body(), &[1, 2])).expect_err("oversigned"),
        vec![ValidationError::UnneededWitnesses]
    );
}

#[test]
fn a_signature_over_the_wrong_body_does_not_verify() {
    let state = funded_state();

    let mut other = transfer_body();
    other.ttl = 19;

    // right key, wrong message
    let stolen = make_tx(other, &[1]).witnesses;
    let tx = Tx::new(transfer_body(), stolen);

    assert_eq!(
        apply_tx(1, &state, &tx).expect_err("forged witness"),
        vec![ValidationError::InvalidWitness]
    );
}

#[test]
fn value_must_be_conserved_to_the_unit() {
    let state = funded_state();

    let mut body = transfer_body();
    body.outputs = vec![output(2, 2, 998)];

    assert_eq!(
        apply_tx(1, &state, &make_tx(body, &[1])).expect_err("one unit short"),
        vec![ValidationError::ValueNotConserved(1000, 999)]
    );
}

#[test]
fn duplicate_pool_registration_in_one_body_locks_a_single_deposit() {
    let state = funded_state();

    // two registrations of the same fresh pool: one deposit of 5 is owed,
    // so the change reflects exactly one charge
    let body = TxBody {
        inputs: BTreeSet::from([genesis_input(0)]),
        outputs: vec![output(1, 1, 994)],
        certs: vec![
            Cert::RegPool(pool_params(10)),
            Cert::RegPool(pool_params(10)),
        ],
        fee: 1,
        ttl: 20,
        ..Default::default()
    };

    let next = apply_tx(1, &state, &make_tx(body, &[1, 10])).expect("double registration body");

    assert!(next.pstate.is_registered(&hash(10)));
    assert_eq!(next.utxo_state.deposited, next.pparams.pool_deposit);
    assert_eq!(next.circulation(), state.circulation());
}

#[test]
fn registering_and_dropping_a_key_in_one_body_nets_to_nothing() {
    let state = funded_state();

    // deposit of 7 charged by the registration, refunded undecayed by the
    // deregistration that follows it
    let body = TxBody {
        inputs: BTreeSet::from([genesis_input(0)]),
        outputs: vec![output(1, 1, 999)],
        certs: vec![Cert::RegKey(hash(3)), Cert::DeRegKey(hash(3))],
        fee: 1,
        ttl: 20,
        ..Default::default()
    };

    let next = apply_tx(1, &state, &make_tx(body, &[1, 3])).expect("churn body");

    assert_eq!(next.utxo_state.deposited, 0);
    assert!(next.dstate.stake_keys.is_empty());
    assert!(next.dstate.rewards.is_empty());
    assert!(next.dstate.ptrs.is_empty());
    assert_eq!(next.circulation(), state.circulation());
}

#[test]
fn certificates_against_absent_registrations_are_rejected() {
    let state = funded_state();

    let with_cert = |cert: Cert, outputs_coin: u64| {
        let body = TxBody {
            inputs: BTreeSet::from([genesis_input(0)]),
            outputs: vec![output(1, 1, outputs_coin)],
            certs: vec![cert.clone()],
            fee: 1,
            ttl: 20,
            ..Default::default()
        };

        make_tx(body, &[1, cert_seed(&cert)])
    };

    assert_eq!(
        apply_tx(1, &state, &with_cert(Cert::DeRegKey(hash(3)), 999))
            .expect_err("nothing to deregister"),
        vec![ValidationError::StakeKeyNotRegistered]
    );

    assert_eq!(
        apply_tx(
            1,
            &state,
            &with_cert(
                Cert::Delegate {
                    delegator: hash(3),
                    pool: hash(10),
                },
                999,
            )
        )
        .expect_err("delegating from nowhere"),
        vec![ValidationError::StakeDelegationImpossible]
    );

    // register once (costs the 7-unit deposit), then try again
    let registered = apply_tx(1, &state, &with_cert(Cert::RegKey(hash(3)), 992))
        .expect("first registration");

    let again = TxBody {
        inputs: BTreeSet::from([TxIn::new(
            with_cert(Cert::RegKey(hash(3)), 992).body.id(),
            0,
        )]),
        outputs: vec![output(1, 1, 984)],
        certs: vec![Cert::RegKey(hash(3))],
        fee: 1,
        ttl: 20,
        ..Default::default()
    };

    assert_eq!(
        apply_tx(1, &registered, &make_tx(again, &[1, 3])).expect_err("double registration"),
        vec![ValidationError::StakeKeyAlreadyRegistered]
    );
}

fn cert_seed(cert: &Cert) -> u8 {
    match cert {
        Cert::RegKey(_) | Cert::DeRegKey(_) => 3,
        Cert::Delegate { .. } => 3,
        Cert::RegPool(_) => 10,
        Cert::RetirePool { .. } => 10,
    }
}
