//! Executor HTTP adapter: reachability, relay capabilities and quotes.
//!
//! In mock mode the endpoint itself selects a canned response from the
//! `mock://executor/...` family, so executor checks run offline.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::io::source::{ReadFailure, now_timestamp, request_id};

pub const EXECUTOR_SOURCE: &str = "adapter/executor-http";

pub const EXECUTOR_ENDPOINT_NOT_CONFIGURED: &str = "EXECUTOR_ENDPOINT_NOT_CONFIGURED";
pub const EXECUTOR_ENDPOINT_INVALID: &str = "EXECUTOR_ENDPOINT_INVALID";
pub const EXECUTOR_HTTP_TIMEOUT: &str = "EXECUTOR_HTTP_TIMEOUT";
pub const EXECUTOR_HTTP_UNAVAILABLE: &str = "EXECUTOR_HTTP_UNAVAILABLE";
pub const EXECUTOR_MOCK_RESPONSE_INVALID: &str = "EXECUTOR_MOCK_RESPONSE_INVALID";

static MOCK_STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^mock://executor/status/(\d{3})$").expect("mock status regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorMode {
    Mock,
    Real,
}

/// One GET against the executor: base endpoint plus a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorRequest {
    pub endpoint: Option<String>,
    pub path: String,
    pub mock_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReadMeta {
    pub mode: ExecutorMode,
    pub endpoint: Option<String>,
    pub request_url: Option<String>,
    pub retrieved_at: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reachability {
    pub http_status: u16,
    pub reachable: bool,
}

/// Body of a successful GET. `payload_json` is `None` when the body is not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadResponse {
    pub http_status: u16,
    pub payload_raw: String,
    pub payload_json: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorRead<T> {
    pub meta: HttpReadMeta,
    pub outcome: Result<T, ReadFailure>,
}

#[async_trait]
pub trait ExecutorHttp: Send + Sync {
    async fn get_endpoint_reachability(&self, request: &ExecutorRequest)
    -> ExecutorRead<Reachability>;

    async fn get_relay_capabilities(&self, request: &ExecutorRequest)
    -> ExecutorRead<PayloadResponse>;

    async fn get_quote_payload(&self, request: &ExecutorRequest) -> ExecutorRead<PayloadResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Health,
    Capabilities,
    Quote,
}

impl Resource {
    fn request_prefix(self) -> &'static str {
        match self {
            Resource::Health => "executor-reachability",
            Resource::Capabilities => "executor-capabilities",
            Resource::Quote => "executor-quote",
        }
    }
}

/// [`ExecutorHttp`] over reqwest, with the `mock://` family handled in-process.
#[derive(Debug, Clone)]
pub struct ExecutorHttpAdapter {
    client: Client,
    timeout: Duration,
}

impl ExecutorHttpAdapter {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    async fn read(&self, request: &ExecutorRequest, resource: Resource) -> ExecutorRead<PayloadResponse> {
        let mode = if request.mock_mode {
            ExecutorMode::Mock
        } else {
            ExecutorMode::Real
        };
        let mut meta = HttpReadMeta {
            mode,
            endpoint: request.endpoint.clone(),
            request_url: None,
            retrieved_at: now_timestamp(),
            request_id: request_id(resource.request_prefix()),
        };

        let Some(endpoint) = request.endpoint.as_deref() else {
            return ExecutorRead {
                meta,
                outcome: Err(ReadFailure::new(
                    EXECUTOR_ENDPOINT_NOT_CONFIGURED,
                    "Executor endpoint is not configured.",
                )),
            };
        };

        if request.mock_mode {
            meta.request_url = Some(endpoint.to_string());
            return ExecutorRead {
                meta,
                outcome: mock_response(endpoint, resource),
            };
        }

        let url = match Url::parse(endpoint).and_then(|base| base.join(&request.path)) {
            Ok(url) => url,
            Err(err) => {
                return ExecutorRead {
                    meta,
                    outcome: Err(ReadFailure::new(EXECUTOR_ENDPOINT_INVALID, err.to_string())),
                };
            }
        };
        meta.request_url = Some(url.to_string());
        let outcome = self.get(url).await;
        if let Err(failure) = &outcome {
            warn!(reason_code = failure.reason_code, "executor GET degraded");
        }
        ExecutorRead { meta, outcome }
    }

    async fn get(&self, url: Url) -> Result<PayloadResponse, ReadFailure> {
        debug!(%url, "executor GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.classify(&err))?;
        let http_status = response.status().as_u16();
        let payload_raw = response.text().await.map_err(|err| self.classify(&err))?;
        Ok(PayloadResponse {
            http_status,
            payload_json: serde_json::from_str(&payload_raw).ok(),
            payload_raw,
        })
    }

    fn classify(&self, err: &reqwest::Error) -> ReadFailure {
        if err.is_timeout() {
            ReadFailure::new(
                EXECUTOR_HTTP_TIMEOUT,
                format!("Executor HTTP timeout after {}ms.", self.timeout.as_millis()),
            )
        } else {
            ReadFailure::new(EXECUTOR_HTTP_UNAVAILABLE, err.to_string())
        }
    }
}

#[async_trait]
impl ExecutorHttp for ExecutorHttpAdapter {
    #[instrument(skip_all, fields(endpoint = ?request.endpoint, mock = request.mock_mode))]
    async fn get_endpoint_reachability(
        &self,
        request: &ExecutorRequest,
    ) -> ExecutorRead<Reachability> {
        let read = self.read(request, Resource::Health).await;
        ExecutorRead {
            meta: read.meta,
            outcome: read.outcome.map(|response| Reachability {
                http_status: response.http_status,
                reachable: (200..=299).contains(&response.http_status),
            }),
        }
    }

    #[instrument(skip_all, fields(endpoint = ?request.endpoint, mock = request.mock_mode))]
    async fn get_relay_capabilities(
        &self,
        request: &ExecutorRequest,
    ) -> ExecutorRead<PayloadResponse> {
        self.read(request, Resource::Capabilities).await
    }

    #[instrument(skip_all, fields(endpoint = ?request.endpoint, mock = request.mock_mode))]
    async fn get_quote_payload(&self, request: &ExecutorRequest) -> ExecutorRead<PayloadResponse> {
        self.read(request, Resource::Quote).await
    }
}

fn mock_response(endpoint: &str, resource: Resource) -> Result<PayloadResponse, ReadFailure> {
    let (status, payload) = match resource {
        Resource::Health => (mock_status(endpoint), Some(String::new())),
        Resource::Capabilities => (Some(200), mock_capabilities_payload(endpoint)),
        Resource::Quote => (Some(200), mock_quote_payload(endpoint)),
    };
    match (status, payload) {
        (Some(http_status), Some(payload_raw)) => Ok(PayloadResponse {
            http_status,
            payload_json: serde_json::from_str(&payload_raw).ok(),
            payload_raw,
        }),
        _ => Err(ReadFailure::new(
            EXECUTOR_MOCK_RESPONSE_INVALID,
            mock_endpoint_hint(resource),
        )),
    }
}

fn mock_endpoint_hint(resource: Resource) -> &'static str {
    match resource {
        Resource::Health => {
            "Mock endpoint must be one of: mock://executor/reachable, mock://executor/unreachable, mock://executor/status/<code>."
        }
        Resource::Capabilities => {
            "Mock capabilities endpoint must be one of: mock://executor/capabilities/valid, mock://executor/capabilities/missing-field, mock://executor/capabilities/invalid-json, or mock://executor/reachable."
        }
        Resource::Quote => {
            "Mock quote endpoint must be one of: mock://executor/quote/valid, mock://executor/quote/missing-field, mock://executor/quote/invalid-json, or mock://executor/reachable."
        }
    }
}

fn mock_status(endpoint: &str) -> Option<u16> {
    match endpoint {
        "mock://executor/reachable"
        | "mock://executor/capabilities/valid"
        | "mock://executor/capabilities/missing-field"
        | "mock://executor/capabilities/invalid-json"
        | "mock://executor/quote/valid"
        | "mock://executor/quote/missing-field"
        | "mock://executor/quote/invalid-json" => Some(200),
        "mock://executor/unreachable" => Some(503),
        _ => MOCK_STATUS_RE
            .captures(endpoint)
            .and_then(|caps| caps[1].parse().ok()),
    }
}

fn mock_capabilities_payload(endpoint: &str) -> Option<String> {
    let payload = match endpoint {
        "mock://executor/reachable" | "mock://executor/capabilities/valid" => json!({
            "supported_chains": ["Solana", "Base"],
            "supported_relay_types": ["ERN1"],
            "status": "active"
        }),
        "mock://executor/capabilities/missing-field" => json!({
            "supported_chains": ["Solana", "Base"],
            "status": "active"
        }),
        "mock://executor/capabilities/invalid-json" => return Some("{invalid-json".to_string()),
        _ => return None,
    };
    Some(payload.to_string())
}

fn mock_quote_payload(endpoint: &str) -> Option<String> {
    let payload = match endpoint {
        "mock://executor/reachable" | "mock://executor/quote/valid" => json!({
            "from_chain": "Solana",
            "to_chain": "Base",
            "amount_out": "1000000"
        }),
        "mock://executor/quote/missing-field" => json!({
            "from_chain": "Solana",
            "to_chain": "Base"
        }),
        "mock://executor/quote/invalid-json" => return Some("{invalid-json".to_string()),
        _ => return None,
    };
    Some(payload.to_string())
}
