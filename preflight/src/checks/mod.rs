//! Check definitions and their evaluation procedures.
//!
//! A check reads what it needs through the adapters in [`CheckContext`] and
//! reports a [`RawCheckResult`]. Source problems become SKIPPED or FAIL
//! results; an `Err` is reserved for faults in the check itself and aborts the
//! run.

use async_trait::async_trait;

use crate::core::result::{CheckDefinition, RawCheckResult};

pub mod compute_budget;
pub mod config_intent;
pub mod context;
pub mod decimals_sync;
pub mod executor;
pub mod executor_config;
pub mod peer_mapping;
pub mod peer_symmetry;
pub mod registration_source;
pub mod rpc_health;
pub mod support;

pub use context::{CheckContext, RuntimeOptions};

#[async_trait]
pub trait Check: Send + Sync {
    fn definition(&self) -> &CheckDefinition;

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult>;
}
