//! Deterministic, pure logic for the cycle loop.
//!
//! Core modules must be free of I/O side effects. All randomness flows in
//! through an injected [`rand::Rng`], so tests can replay exact sequences.

pub mod delay;
pub mod diff;
pub mod prompt;
pub mod session;
