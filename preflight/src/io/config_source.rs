//! Intent configuration and fixture documents read from disk.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::io::source::{ReadFailure, now_timestamp};

/// `source` recorded in evidence for documents read through this adapter.
pub const CONFIG_SOURCE_KIND: &str = "config-file";

pub const CONFIG_NOT_FOUND: &str = "CONFIG_NOT_FOUND";
pub const CONFIG_UNREADABLE: &str = "CONFIG_UNREADABLE";
pub const CONFIG_PARSE_ERROR: &str = "CONFIG_PARSE_ERROR";

/// Outcome of reading one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRead {
    pub path: String,
    pub retrieved_at: String,
    /// Raw UTF-8 text, or the classified read failure.
    pub outcome: Result<String, ReadFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{details}")]
pub struct ConfigParseError {
    pub details: String,
}

impl ConfigParseError {
    pub fn reason_code(&self) -> &'static str {
        CONFIG_PARSE_ERROR
    }
}

/// Reads and parses JSON documents (the intent config and mock fixtures).
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn read_config(&self, path: &str) -> ConfigRead;

    fn parse_config(&self, raw: &str) -> Result<Value, ConfigParseError> {
        serde_json::from_str(raw).map_err(|err| ConfigParseError {
            details: err.to_string(),
        })
    }
}

/// Filesystem-backed [`ConfigSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigFileAdapter;

#[async_trait]
impl ConfigSource for ConfigFileAdapter {
    #[instrument(skip_all, fields(path = %path))]
    async fn read_config(&self, path: &str) -> ConfigRead {
        let retrieved_at = now_timestamp();
        let outcome = tokio::fs::read_to_string(path).await.map_err(|err| {
            let reason_code = if err.kind() == std::io::ErrorKind::NotFound {
                CONFIG_NOT_FOUND
            } else {
                CONFIG_UNREADABLE
            };
            debug!(reason_code, error = %err, "config read failed");
            ReadFailure::new(reason_code, format!("{:?}: {err}", err.kind()))
        });
        ConfigRead {
            path: path.to_string(),
            retrieved_at,
            outcome,
        }
    }
}
