//! Exact rational arithmetic helpers for the reward and refund formulas.

#[macro_export]
macro_rules! ratio {
    ($numer:expr, $denom:expr) => {{
        let numer = num_bigint::BigInt::from($numer);
        let denom = num_bigint::BigInt::from($denom);
        num_rational::BigRational::new(numer, denom)
    }};
    ($x:expr) => {{
        let x = num_bigint::BigInt::from($x);
        num_rational::BigRational::from_integer(x)
    }};
}

#[macro_export]
macro_rules! floor_int {
    ($x:expr, $ty:ty) => {
        <$ty>::try_from($x.floor().to_integer()).unwrap()
    };
}

use num_rational::BigRational;

/// `base^exp` by squaring; exact over rationals.
pub fn rpow(base: &BigRational, mut exp: u64) -> BigRational {
    let mut result = ratio!(1);
    let mut square = base.clone();

    while exp > 0 {
        if exp & 1 == 1 {
            result *= &square;
        }

        exp >>= 1;

        if exp > 0 {
            square = &square * &square;
        }
    }

    result
}
