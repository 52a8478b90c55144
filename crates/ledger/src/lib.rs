//! The stela rules engine.
//!
//! A pure state-transition function for a UTxO-style ledger with stake
//! delegation and pool reward accounting. Given a ledger state and an event
//! (a transaction, or an epoch boundary), the engine either produces the next
//! state or reports every rule the event violates. There is no I/O, no
//! clock and no internal mutability: identical inputs produce identical
//! outputs, down to iteration order.
//!
//! Entry points:
//!  - [`apply_tx`] validates and applies a transaction.
//!  - [`retire_pools`] runs the epoch-boundary retirement sweep.
//!  - [`rotate_snapshots`] rolls the mark/set/go stake snapshots.
//!  - [`create_reward_update`] / [`apply_reward_update`] compute and commit
//!    an epoch's reward distribution.
//!  - [`stake_distribution`] materializes stake-by-credential from the utxo
//!    and the delegation maps.

pub mod delegation;
pub mod epoch;
pub mod math;
pub mod rewards;
pub mod stake;
pub mod transition;
pub mod utxo;
pub mod validate;

pub use delegation::{DState, PState};
pub use epoch::{
    apply_reward_update, retire_pools, rotate_snapshots, take_snapshot, Accounts, BlocksMade,
    EpochState, RewardUpdate, SnapShot, SnapShots,
};
pub use rewards::create_reward_update;
pub use stake::{pool_stake, stake_distribution};
pub use transition::{apply_tx, genesis_state, LedgerState};
pub use utxo::{UTxO, UTxOState};

#[cfg(any(test, feature = "conformance"))]
pub use transition::{apply_tx_unchecked, LedgerValidation};
