//! Stable exit codes for the agentloop binary.

/// Graceful stop after a single interrupt.
pub const OK: i32 = 0;
/// Startup failure or unrecoverable defect.
pub const ERROR: i32 = 1;
/// Forced termination by a second interrupt.
pub const FORCED_STOP: i32 = 130;
