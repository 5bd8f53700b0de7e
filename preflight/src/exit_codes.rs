//! Stable exit codes for the `ntt-preflight` CLI.
//!
//! Check outcomes never change the exit code; CI reads `ci_should_fail` from
//! `report.json`.

/// Command finished and its artifacts were written.
pub const OK: i32 = 0;
/// Invalid arguments, unreadable settings, a failed config precondition or a
/// fatal check fault.
pub const INVALID: i32 = 1;
