//! The unspent-output set and its algebra.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use stela_core::{Coin, ExtraEntropy, TxBody, TxIn, TxOut};

/// Map from transaction input to the output it would spend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UTxO(BTreeMap<TxIn, TxOut>);

impl UTxO {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, input: TxIn, output: TxOut) {
        self.0.insert(input, output);
    }

    pub fn get(&self, input: &TxIn) -> Option<&TxOut> {
        self.0.get(input)
    }

    pub fn contains(&self, input: &TxIn) -> bool {
        self.0.contains_key(input)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TxIn, &TxOut)> {
        self.0.iter()
    }

    /// Total coin held by the set.
    pub fn balance(&self) -> Coin {
        self.0.values().map(|out| out.coin).sum()
    }

    /// Total coin of the given inputs that resolve in the set; unknown inputs
    /// contribute nothing (they are flagged separately by `valid_inputs`).
    pub fn resolved_balance(&self, inputs: &BTreeSet<TxIn>) -> Coin {
        inputs
            .iter()
            .filter_map(|input| self.get(input))
            .map(|out| out.coin)
            .sum()
    }

    /// The outputs a body creates, keyed under its id.
    pub fn outputs_of(body: &TxBody) -> impl Iterator<Item = (TxIn, TxOut)> + '_ {
        let id = body.id();

        body.outputs
            .iter()
            .enumerate()
            .map(move |(ix, out)| (TxIn::new(id, ix as u32), *out))
    }

    /// `(self ◁ inputs) ∪ outputs`: drop the spent entries, add the created
    /// ones.
    pub fn apply_body(&self, body: &TxBody) -> UTxO {
        let mut next: BTreeMap<TxIn, TxOut> = self
            .0
            .iter()
            .filter(|(input, _)| !body.inputs.contains(input))
            .map(|(input, out)| (*input, *out))
            .collect();

        next.extend(Self::outputs_of(body));

        UTxO(next)
    }
}

impl FromIterator<(TxIn, TxOut)> for UTxO {
    fn from_iter<T: IntoIterator<Item = (TxIn, TxOut)>>(iter: T) -> Self {
        UTxO(iter.into_iter().collect())
    }
}

/// The utxo with its companion pots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UTxOState {
    pub utxo: UTxO,

    /// Sum of the deposits still locked by registered keys and pools.
    pub deposited: Coin,

    /// Fees accumulated since the last epoch boundary.
    pub fees: Coin,

    /// Extra entropy contributed by genesis delegates.
    pub entropy: ExtraEntropy,
}
