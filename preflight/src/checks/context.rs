//! Shared, read-only inputs of a verification run.

use std::path::PathBuf;

use crate::core::types::{FailOn, ProfileName};
use crate::io::adapters::AdapterRegistry;
use crate::io::settings::VerifierSettings;

pub const DEFAULT_CONFIG_PATH: &str = "./ntt.json";
pub const DEFAULT_MOCK_CHAIN_PATH: &str = "./fixtures/broken-state.json";
pub const DEFAULT_EXECUTOR_HEALTH_PATH: &str = "/";
pub const DEFAULT_EXECUTOR_CAPABILITIES_PATH: &str = "/v0/capabilities";
pub const DEFAULT_EXECUTOR_QUOTE_PATH: &str = "/v0/quote";
pub const DEFAULT_OUTPUT_DIR: &str = "./artifacts";

/// Options of one `verify`/`plan` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub profile: ProfileName,
    pub config_path: String,
    pub rpc_url: String,
    /// EVM RPC endpoint. Accepted for forward compatibility; no check reads EVM state.
    pub rpc_evm: Option<String>,
    pub executor_url: Option<String>,
    pub executor_health_path: String,
    pub executor_capabilities_path: String,
    pub executor_quote_path: String,
    /// Read registrations from the fixture instead of Solana RPC.
    pub mock_chain: bool,
    pub mock_chain_path: String,
    pub deep: bool,
    pub output_dir: PathBuf,
    pub fail_on: FailOn,
}

impl RuntimeOptions {
    /// Options with every optional flag at its default.
    pub fn new(profile: ProfileName, rpc_url: impl Into<String>) -> Self {
        Self {
            profile,
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            rpc_url: rpc_url.into(),
            rpc_evm: None,
            executor_url: None,
            executor_health_path: DEFAULT_EXECUTOR_HEALTH_PATH.to_string(),
            executor_capabilities_path: DEFAULT_EXECUTOR_CAPABILITIES_PATH.to_string(),
            executor_quote_path: DEFAULT_EXECUTOR_QUOTE_PATH.to_string(),
            mock_chain: false,
            mock_chain_path: DEFAULT_MOCK_CHAIN_PATH.to_string(),
            deep: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fail_on: FailOn::default(),
        }
    }
}

/// Built once per run and shared by reference with every check.
#[derive(Debug, Clone)]
pub struct CheckContext {
    pub options: RuntimeOptions,
    pub adapters: AdapterRegistry,
    pub settings: VerifierSettings,
}
