//! Bounded rational parameters.
//!
//! Protocol parameters that are fractions (refund curve, monetary expansion,
//! treasury share, pledge influence) are carried as numerator/denominator
//! pairs and converted to arbitrary-precision rationals at the math sites.

use num_bigint::BigInt;
use num_rational::BigRational;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("denominator must not be zero")]
    ZeroDenominator,

    #[error("value {0}/{1} outside the unit interval")]
    OutsideUnit(u64, u64),
}

/// A rational in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitInterval {
    numerator: u64,
    denominator: u64,
}

impl UnitInterval {
    pub const ZERO: Self = Self {
        numerator: 0,
        denominator: 1,
    };

    pub const ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self, IntervalError> {
        if denominator == 0 {
            return Err(IntervalError::ZeroDenominator);
        }

        if numerator > denominator {
            return Err(IntervalError::OutsideUnit(numerator, denominator));
        }

        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn to_ratio(&self) -> BigRational {
        BigRational::new(
            BigInt::from(self.numerator),
            BigInt::from(self.denominator),
        )
    }
}

impl PartialEq for UnitInterval {
    fn eq(&self, other: &Self) -> bool {
        // cross-multiplied so that 1/2 == 2/4
        self.numerator as u128 * other.denominator as u128
            == other.numerator as u128 * self.denominator as u128
    }
}

impl Eq for UnitInterval {}

impl PartialOrd for UnitInterval {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitInterval {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let lhs = self.numerator as u128 * other.denominator as u128;
        let rhs = other.numerator as u128 * self.denominator as u128;
        lhs.cmp(&rhs)
    }
}

/// A rational in `[0, ∞)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NonNegInterval {
    numerator: u64,
    denominator: u64,
}

impl NonNegInterval {
    pub const ZERO: Self = Self {
        numerator: 0,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self, IntervalError> {
        if denominator == 0 {
            return Err(IntervalError::ZeroDenominator);
        }

        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn to_ratio(&self) -> BigRational {
        BigRational::new(
            BigInt::from(self.numerator),
            BigInt::from(self.denominator),
        )
    }
}

impl PartialEq for NonNegInterval {
    fn eq(&self, other: &Self) -> bool {
        self.numerator as u128 * other.denominator as u128
            == other.numerator as u128 * self.denominator as u128
    }
}

impl Eq for NonNegInterval {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_rejects_out_of_range() {
        assert_eq!(UnitInterval::new(3, 2), Err(IntervalError::OutsideUnit(3, 2)));
        assert_eq!(UnitInterval::new(1, 0), Err(IntervalError::ZeroDenominator));
        assert!(UnitInterval::new(1, 2).is_ok());
    }

    #[test]
    fn equality_is_value_based() {
        let half = UnitInterval::new(1, 2).unwrap();
        let also_half = UnitInterval::new(2, 4).unwrap();
        let third = UnitInterval::new(1, 3).unwrap();

        assert_eq!(half, also_half);
        assert!(third < half);
    }
}
