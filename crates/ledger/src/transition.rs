//! The ledger state and the transaction transition.

use serde::{Deserialize, Serialize};
use tracing::debug;

use stela_core::{
    ExtraEntropy, PParams, Ptr, Slot, Tx, TxBody, TxIn, TxIx, TxOut, ValidationError,
};

use crate::delegation::{self, DState, PState};
use crate::utxo::{UTxO, UTxOState};
use crate::validate;

/// The full per-slot ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub utxo_state: UTxOState,
    pub dstate: DState,
    pub pstate: PState,
    pub pparams: PParams,

    /// Index of the last applied tx within `current_slot`; keeps certificate
    /// pointers unique when several txs land in one slot.
    pub tx_slot_ix: TxIx,

    pub current_slot: Slot,
}

impl LedgerState {
    /// Evaluate every validator against this state.
    pub fn validate(&self, slot: Slot, tx: &Tx) -> stela_core::Validity {
        validate::validate_tx(
            slot,
            &self.pparams,
            &self.utxo_state,
            &self.dstate,
            &self.pstate,
            tx,
        )
    }

    /// Total coin across the utxo and the three account pots. Constant under
    /// `apply_tx`; reward updates and reserve flows move it deliberately.
    pub fn circulation(&self) -> u64 {
        self.utxo_state.utxo.balance()
            + self.utxo_state.deposited
            + self.utxo_state.fees
            + self.dstate.rewards.values().sum::<u64>()
    }
}

/// The state every chain starts from: the genesis outputs keyed under the
/// hash of the empty body.
pub fn genesis_state(pparams: PParams, outputs: Vec<TxOut>) -> LedgerState {
    let genesis_id = TxBody::default().id();

    let utxo: UTxO = outputs
        .into_iter()
        .enumerate()
        .map(|(ix, out)| (TxIn::new(genesis_id, ix as u32), out))
        .collect();

    LedgerState {
        utxo_state: UTxOState {
            utxo,
            deposited: 0,
            fees: 0,
            entropy: ExtraEntropy::new(),
        },
        dstate: DState::default(),
        pstate: PState::default(),
        pparams,
        tx_slot_ix: 0,
        current_slot: 0,
    }
}

/// Validate and apply one transaction at the given slot.
///
/// On success the next state is returned; on failure the caller gets every
/// violated rule and the state is untouched.
pub fn apply_tx(
    slot: Slot,
    state: &LedgerState,
    tx: &Tx,
) -> Result<LedgerState, Vec<ValidationError>> {
    state.validate(slot, tx).into_result()?;

    let mut next = state.clone();
    apply_body(&mut next, slot, &tx.body);

    Ok(next)
}

/// Apply a validated body. Steps are ordered: utxo, pots, withdrawals, slot
/// index, certificates.
fn apply_body(state: &mut LedgerState, slot: Slot, body: &TxBody) {
    let deposits = validate::deposits(&state.pparams, &state.pstate.pools, &body.certs);
    let refunds = validate::key_refunds(&state.pparams, &state.dstate.stake_keys, body);

    state.utxo_state.utxo = state.utxo_state.utxo.apply_body(body);

    debug_assert!(state.utxo_state.deposited + deposits >= refunds);
    state.utxo_state.deposited = state.utxo_state.deposited + deposits - refunds;

    state.utxo_state.fees += body.fee;

    state
        .utxo_state
        .entropy
        .extend(body.entropy.iter().map(|(genesis, seed)| (*genesis, seed.clone())));

    // withdrawn accounts are drained, not deleted
    for account in body.withdrawals.keys() {
        if let Some(balance) = state.dstate.rewards.get_mut(account) {
            *balance = 0;
        }
    }

    if slot == state.current_slot {
        state.tx_slot_ix += 1;
    } else {
        state.tx_slot_ix = 0;
        state.current_slot = slot;
    }

    for (ix, cert) in body.certs.iter().enumerate() {
        let ptr = Ptr::new(state.current_slot, state.tx_slot_ix, ix as u32);
        delegation::apply_cert(&mut state.dstate, &mut state.pstate, cert, state.current_slot, ptr);
    }

    debug!(
        slot,
        fee = body.fee,
        certs = body.certs.len(),
        utxo = state.utxo_state.utxo.len(),
        "applied transaction body"
    );
}

/// A state paired with every error accumulated while reaching it.
#[cfg(any(test, feature = "conformance"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerValidation {
    pub errors: Vec<ValidationError>,
    pub state: LedgerState,
}

#[cfg(any(test, feature = "conformance"))]
impl LedgerValidation {
    pub fn new(state: LedgerState) -> Self {
        Self {
            errors: vec![],
            state,
        }
    }
}

/// Conformance entry point: record the verdict but apply the body no matter
/// what. This is the only place an invalid transaction mutates state; it
/// exists for trace-level comparison against the abstract rules and must not
/// be reachable from production paths.
#[cfg(any(test, feature = "conformance"))]
pub fn apply_tx_unchecked(slot: Slot, validation: LedgerValidation, tx: &Tx) -> LedgerValidation {
    let LedgerValidation { mut errors, mut state } = validation;

    errors.extend(state.validate(slot, tx).into_errors());
    apply_body(&mut state, slot, &tx.body);

    LedgerValidation { errors, state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stela_core::{Addr, NonNegInterval, UnitInterval};

    fn pparams() -> PParams {
        PParams {
            min_fee_a: 0,
            min_fee_b: 0,
            key_deposit: 0,
            pool_deposit: 0,
            key_min_refund: UnitInterval::ONE,
            key_decay_rate: UnitInterval::ZERO,
            rho: UnitInterval::ZERO,
            tau: UnitInterval::ZERO,
            a0: NonNegInterval::ZERO,
            n_opt: 10,
            active_slot_coeff: UnitInterval::ONE,
            slots_per_epoch: 100,
        }
    }

    fn hash28(label: u8) -> stela_core::KeyHash {
        pallas_crypto::hash::Hasher::<224>::hash(&[label])
    }

    #[test]
    fn genesis_outputs_live_under_the_empty_body_hash() {
        let out = TxOut::new(
            Addr::Key {
                payment: hash28(1),
                stake: hash28(2),
            },
            1000,
        );

        let state = genesis_state(pparams(), vec![out]);

        let genesis_id = TxBody::default().id();
        assert!(state.utxo_state.utxo.contains(&TxIn::new(genesis_id, 0)));
        assert_eq!(state.utxo_state.utxo.balance(), 1000);
        assert_eq!(state.circulation(), 1000);
    }

    #[test]
    fn slot_index_resets_on_slot_change_and_increments_within_a_slot() {
        let mut state = genesis_state(pparams(), vec![]);

        let body = TxBody::default();

        apply_body(&mut state, 5, &body);
        assert_eq!((state.current_slot, state.tx_slot_ix), (5, 0));

        apply_body(&mut state, 5, &body);
        assert_eq!((state.current_slot, state.tx_slot_ix), (5, 1));

        apply_body(&mut state, 9, &body);
        assert_eq!((state.current_slot, state.tx_slot_ix), (9, 0));
    }

    #[test]
    fn entropy_contributions_accumulate() {
        let mut state = genesis_state(pparams(), vec![]);

        let genesis = hash28(1);

        let body = TxBody {
            entropy: ExtraEntropy::from([(genesis, vec![0xAB])]),
            ..Default::default()
        };

        apply_body(&mut state, 1, &body);

        assert_eq!(state.utxo_state.entropy.get(&genesis), Some(&vec![0xAB]));
    }
}
