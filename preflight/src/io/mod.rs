//! Side-effecting adapters: filesystem, JSON-RPC, HTTP and artifacts.

pub mod adapters;
pub mod artifacts;
pub mod config_source;
pub mod executor_http;
pub mod settings;
pub mod solana_rpc;
pub mod source;
