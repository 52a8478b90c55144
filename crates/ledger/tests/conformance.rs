//! The unchecked entry point: errors accumulate while the state advances
//! regardless, for trace-level comparison against the abstract rules.

use std::collections::BTreeSet;

use stela_core::{TxBody, TxIn, ValidationError};
use stela_ledger::{apply_tx, apply_tx_unchecked, genesis_state, LedgerValidation};
use stela_testing::{make_tx, output, trace_pparams};

fn genesis_input(index: u32) -> TxIn {
    TxIn::new(TxBody::default().id(), index)
}

#[test]
fn unchecked_application_records_errors_and_mutates_anyway() {
    let state = genesis_state(trace_pparams(), vec![output(1, 1, 1000)]);

    let valid = TxBody {
        inputs: BTreeSet::from([genesis_input(0)]),
        outputs: vec![output(2, 2, 999)],
        fee: 1,
        ttl: 40,
        ..Default::default()
    };

    // underpays the floor but is otherwise fine
    let underpaying = TxBody {
        inputs: BTreeSet::from([genesis_input(0)]),
        outputs: vec![output(2, 2, 1000)],
        fee: 0,
        ttl: 40,
        ..Default::default()
    };

    let checked = apply_tx(1, &state, &make_tx(underpaying.clone(), &[1]));
    assert!(checked.is_err(), "the guarded entry point refuses");

    let run = LedgerValidation::new(state.clone());
    let run = apply_tx_unchecked(1, run, &make_tx(underpaying, &[1]));

    assert_eq!(run.errors, vec![ValidationError::FeeTooSmall(1, 0)]);

    // the body applied: the genesis output is spent despite the error
    assert!(!run.state.utxo_state.utxo.contains(&genesis_input(0)));

    // a valid tx leaves the error log untouched
    let run2 = apply_tx_unchecked(1, LedgerValidation::new(state.clone()), &make_tx(valid.clone(), &[1]));
    assert!(run2.errors.is_empty());

    // and matches what the guarded entry point produces
    let guarded = apply_tx(1, &state, &make_tx(valid, &[1])).expect("valid");
    assert_eq!(run2.state, guarded);
}
