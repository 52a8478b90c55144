//! The error taxonomy and the accumulating validity monoid.
//!
//! Validation never short-circuits: each predicate reports its own verdict
//! and the fold concatenates every failure so a caller sees all the reasons
//! a transaction was rejected in a single pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Coin, Epoch, Slot};

/// Enumerated failure modes, in stable wire order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("transaction consumes inputs that are not in the utxo")]
    BadInputs,

    #[error("transaction expired: ttl {0} behind current slot {1}")]
    Expired(Slot, Slot),

    #[error("retirement epoch {0} is not after the current epoch {1}")]
    RetirementCertExpired(Epoch, Epoch),

    #[error("fee {1} below the minimum {0}")]
    FeeTooSmall(Coin, Coin),

    #[error("value not conserved: consumed {0}, produced {1}")]
    ValueNotConserved(Coin, Coin),

    #[error("withdrawals do not match reward account balances")]
    IncorrectRewards,

    #[error("a witness signature does not verify against the body hash")]
    InvalidWitness,

    #[error("signatures do not cover every required witness")]
    MissingWitnesses,

    #[error("signatures beyond the required witnesses")]
    UnneededWitnesses,

    #[error("input set is empty")]
    InputSetEmpty,

    #[error("stake key already registered")]
    StakeKeyAlreadyRegistered,

    #[error("stake key not registered")]
    StakeKeyNotRegistered,

    #[error("delegation from an unregistered stake key")]
    StakeDelegationImpossible,

    #[error("retirement certificate for an unregistered pool")]
    StakePoolNotRegisteredOnKey,
}

/// Verdict of a single predicate, or of any fold of predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(Vec<ValidationError>),
}

impl Validity {
    pub fn valid() -> Self {
        Validity::Valid
    }

    pub fn invalid(error: ValidationError) -> Self {
        Validity::Invalid(vec![error])
    }

    pub fn require(ok: bool, error: ValidationError) -> Self {
        if ok {
            Validity::Valid
        } else {
            Validity::invalid(error)
        }
    }

    /// Monoid append: `Valid` is the identity, failures concatenate.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Validity::Valid, x) => x,
            (x, Validity::Valid) => x,
            (Validity::Invalid(mut a), Validity::Invalid(b)) => {
                a.extend(b);
                Validity::Invalid(a)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        match self {
            Validity::Valid => Ok(()),
            Validity::Invalid(errors) => Err(errors),
        }
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        match self {
            Validity::Valid => vec![],
            Validity::Invalid(errors) => errors,
        }
    }
}

impl FromIterator<Validity> for Validity {
    fn from_iter<T: IntoIterator<Item = Validity>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Validity::Valid, |acc, v| acc.combine(v))
    }
}
