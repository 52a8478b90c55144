//! Test support for the stela workspace: deterministic key fixtures,
//! transaction builders and the random-trace machinery driving the property
//! tests. Nothing here ships in a production build; the crate exists so every
//! test constructs states the same way.

pub mod builders;
pub mod keys;
pub mod trace;

pub use builders::{key_addr, make_tx, output, pool_params, trace_pparams};
pub use keys::{hash, signing_key, vkey};
pub use trace::{action_strategy, assert_invariants, step, withheld_at, Action};
