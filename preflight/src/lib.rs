//! Read-only pre-flight verifier for NTT cross-chain token bridge deployments.
//!
//! A profile selects an ordered list of checks. Each check inspects the
//! deployment intent (config file), registration state (mock-chain fixture or
//! Solana RPC) or executor service and yields PASS, FAIL or SKIPPED with
//! structured evidence. The crate is split into:
//!
//! - **[`core`]**: Pure, deterministic logic (result model, runtime contract,
//!   peer-key normalization, registration correlation, PDA derivation).
//! - **[`io`]**: Side-effecting adapters (filesystem, Solana JSON-RPC,
//!   executor HTTP, artifacts). Behind traits so tests can substitute fakes.
//! - **[`checks`]**: Check definitions and their evaluation procedures.
//!
//! Orchestration modules ([`engine`], [`registry`], [`verify`], [`plan`],
//! [`report`]) combine them into the `verify` and `plan` commands.

pub mod checks;
pub mod core;
pub mod engine;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod plan;
pub mod registry;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod verify;
