//! Protocol parameters.
//!
//! A flat record for a single-era engine. The last two fields are chain
//! constants rather than updatable parameters; they ride along so that every
//! operation stays a pure function of its explicit inputs.

use serde::{Deserialize, Serialize};

use crate::{Coin, Epoch, NonNegInterval, Slot, UnitInterval};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PParams {
    /// Fee floor coefficient on the serialized tx size.
    pub min_fee_a: Coin,

    /// Fee floor constant.
    pub min_fee_b: Coin,

    /// Deposit taken when a stake key registers.
    pub key_deposit: Coin,

    /// Deposit taken when a pool first registers.
    pub pool_deposit: Coin,

    /// Floor of the key deposit refund curve.
    pub key_min_refund: UnitInterval,

    /// Per-slot decay rate of the key deposit refund.
    pub key_decay_rate: UnitInterval,

    /// Monetary expansion: share of the reserves minted each epoch.
    pub rho: UnitInterval,

    /// Treasury share of the epoch reward pot.
    pub tau: UnitInterval,

    /// Pledge influence on the pool reward cap.
    pub a0: NonNegInterval,

    /// Target number of saturated pools.
    pub n_opt: u32,

    /// Chance of any slot having a leader.
    pub active_slot_coeff: UnitInterval,

    /// Slots per epoch.
    pub slots_per_epoch: u64,
}

impl PParams {
    /// The fee floor `a * size + b`.
    pub fn min_fee(&self, tx_size: u64) -> Coin {
        self.min_fee_a * tx_size + self.min_fee_b
    }

    pub fn epoch_of(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch
    }

    pub fn first_slot(&self, epoch: Epoch) -> Slot {
        epoch * self.slots_per_epoch
    }
}
