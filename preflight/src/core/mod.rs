//! Deterministic, pure logic shared by the verifier.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! documents and return deterministic outputs suitable for tests.

pub mod chain;
pub mod compute_budget;
pub mod contract;
pub mod correlation;
pub mod pda;
pub mod peers;
pub mod registration;
pub mod result;
pub mod types;
