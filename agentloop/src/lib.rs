//! Simulated developer driving an autonomous coding agent in a loop.
//!
//! The crate generates human-sounding instructions, hands each one to an
//! external agent binary, measures the resulting workspace diff with git,
//! appends per-cycle metrics to a JSONL log, and paces itself with
//! randomized delays. The architecture enforces a strict split:
//!
//! - **[`core`]**: pure, deterministic logic (instruction generation, delay
//!   sampling, diff parsing, session accounting). All randomness is
//!   injected, so tests replay exact sequences.
//! - **[`io`]**: side effects (workspace seeding, git, subprocesses, the
//!   metrics log). Narrow seams enable scripted fakes in tests.
//!
//! [`looping`] ties the two together into the interruptible cycle loop.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
