//! Read-only Solana JSON-RPC adapter.
//!
//! Every call carries the client timeout and is classified into a
//! [`ReadFailure`] on transport or response problems; nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::core::pda::peer_account_address;
use crate::io::source::{ReadFailure, now_timestamp, request_id};

pub const RPC_SOURCE: &str = "adapter/solana-rpc";
pub const RPC_HEALTH_SOURCE: &str = "adapter/solana-json-rpc";

pub const RPC_TIMEOUT: &str = "RPC_TIMEOUT";
pub const RPC_UNAVAILABLE: &str = "RPC_UNAVAILABLE";
pub const RPC_READ_ERROR: &str = "RPC_READ_ERROR";
pub const RPC_RESPONSE_INVALID: &str = "RPC_RESPONSE_INVALID";
pub const PEER_PDA_DERIVATION_FAILED: &str = "PEER_PDA_DERIVATION_FAILED";

/// Where and when a read happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMeta {
    pub endpoint: String,
    pub retrieved_at: String,
    pub request_id: String,
}

/// A well-formed `getHealth` answer: either a result string or an RPC error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthResponse {
    Result(String),
    Error { code: i64, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRead {
    pub meta: ReadMeta,
    pub outcome: Result<HealthResponse, ReadFailure>,
}

/// Peer account lookup: `["peer", u16_le(chain_id)]` under the manager program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAccountQuery {
    pub manager_program_id: String,
    pub chain_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAccount {
    pub pda: String,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAccountRead {
    pub meta: ReadMeta,
    pub query: PeerAccountQuery,
    pub outcome: Result<PeerAccount, ReadFailure>,
}

#[async_trait]
pub trait SolanaRead: Send + Sync {
    async fn get_health(&self) -> HealthRead;

    async fn get_peer_account_existence(&self, query: &PeerAccountQuery) -> PeerAccountRead;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'a str,
    method: &'a str,
    params: Value,
}

/// [`SolanaRead`] over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct SolanaRpcAdapter {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl SolanaRpcAdapter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    fn meta(&self, retrieved_at: String, request_id: String) -> ReadMeta {
        ReadMeta {
            endpoint: self.endpoint.clone(),
            retrieved_at,
            request_id,
        }
    }

    /// POST one JSON-RPC call and return the decoded response object.
    async fn rpc_call(&self, method: &str, id: &str, params: Value) -> Result<Value, ReadFailure> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.classify(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadFailure::new(
                RPC_READ_ERROR,
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
            ));
        }

        response.json::<Value>().await.map_err(|err| {
            if err.is_timeout() {
                self.classify(&err)
            } else {
                ReadFailure::new(RPC_RESPONSE_INVALID, err.to_string())
            }
        })
    }

    fn classify(&self, err: &reqwest::Error) -> ReadFailure {
        if err.is_timeout() {
            ReadFailure::new(
                RPC_TIMEOUT,
                format!("RPC timeout after {}ms.", self.timeout.as_millis()),
            )
        } else {
            ReadFailure::new(RPC_UNAVAILABLE, err.to_string())
        }
    }
}

/// Interpret a `getHealth` response body.
pub fn interpret_health(payload: &Value) -> Result<HealthResponse, ReadFailure> {
    if let Some(result) = payload.get("result").and_then(Value::as_str) {
        return Ok(HealthResponse::Result(result.to_string()));
    }
    let error = payload.get("error");
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_i64);
    let message = error.and_then(|e| e.get("message")).and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => Ok(HealthResponse::Error {
            code,
            message: message.to_string(),
        }),
        _ => Err(ReadFailure::new(
            RPC_RESPONSE_INVALID,
            "RPC response is not parseable as getHealth result or error.",
        )),
    }
}

/// Interpret a `getAccountInfo` response body: `value: null` means absent.
pub fn interpret_account_info(payload: &Value) -> Result<bool, ReadFailure> {
    match payload.get("result").and_then(|result| result.get("value")) {
        Some(Value::Null) => Ok(false),
        Some(Value::Object(_)) => Ok(true),
        _ => Err(ReadFailure::new(
            RPC_RESPONSE_INVALID,
            "RPC response is not parseable as getAccountInfo result.",
        )),
    }
}

#[async_trait]
impl SolanaRead for SolanaRpcAdapter {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn get_health(&self) -> HealthRead {
        let meta = self.meta(now_timestamp(), request_id("solana-health"));
        let outcome = match self.rpc_call("getHealth", &meta.request_id, json!([])).await {
            Ok(payload) => interpret_health(&payload),
            Err(failure) => Err(failure),
        };
        if let Err(failure) = &outcome {
            warn!(reason_code = failure.reason_code, "getHealth degraded");
        }
        HealthRead { meta, outcome }
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint, chain_id = query.chain_id))]
    async fn get_peer_account_existence(&self, query: &PeerAccountQuery) -> PeerAccountRead {
        let meta = self.meta(now_timestamp(), request_id("solana-peer-exists"));

        let outcome = match peer_account_address(&query.manager_program_id, query.chain_id) {
            Err(err) => Err(ReadFailure::new(
                PEER_PDA_DERIVATION_FAILED,
                format!("Failed to derive peer PDA: {err}"),
            )),
            Ok(pda) => {
                debug!(%pda, "derived peer account address");
                let params = json!([pda, { "encoding": "base64" }]);
                match self.rpc_call("getAccountInfo", &meta.request_id, params).await {
                    Ok(payload) => {
                        interpret_account_info(&payload).map(|exists| PeerAccount { pda, exists })
                    }
                    Err(failure) => Err(failure),
                }
            }
        };
        if let Err(failure) = &outcome {
            warn!(reason_code = failure.reason_code, "getAccountInfo degraded");
        }

        PeerAccountRead {
            meta,
            query: query.clone(),
            outcome,
        }
    }
}
