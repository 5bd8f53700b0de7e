//! Adapter registry handed to every check.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::io::config_source::{ConfigFileAdapter, ConfigSource};
use crate::io::executor_http::{ExecutorHttp, ExecutorHttpAdapter};
use crate::io::settings::VerifierSettings;
use crate::io::solana_rpc::{SolanaRead, SolanaRpcAdapter};

/// Read-only collaborators behind trait objects, so tests can swap in fakes.
#[derive(Clone)]
pub struct AdapterRegistry {
    pub config_source: Arc<dyn ConfigSource>,
    pub solana_read: Arc<dyn SolanaRead>,
    pub executor_http: Arc<dyn ExecutorHttp>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry").finish_non_exhaustive()
    }
}

/// Production adapters: filesystem config, Solana JSON-RPC, executor HTTP.
pub fn create_adapters(rpc_url: &str, settings: &VerifierSettings) -> Result<AdapterRegistry> {
    let timeout = settings.network_timeout();
    let solana = SolanaRpcAdapter::new(rpc_url, timeout).context("build Solana RPC client")?;
    let executor = ExecutorHttpAdapter::new(timeout).context("build executor HTTP client")?;
    Ok(AdapterRegistry {
        config_source: Arc::new(ConfigFileAdapter),
        solana_read: Arc::new(solana),
        executor_http: Arc::new(executor),
    })
}
