//! Executor HTTP checks: reachability, relay capabilities and quote sanity.
//!
//! Configuration and transport problems (no endpoint, invalid URL, timeout)
//! are SKIPPED; a response that violates the minimal policy is FAIL.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::checks::{Check, CheckContext};
use crate::core::result::{
    CheckDefinition, CheckEvidence, EvidenceData, RawCheckResult, RetrievalMarker,
};
use crate::core::types::SeverityClass;
use crate::io::executor_http::{EXECUTOR_SOURCE, ExecutorRequest, HttpReadMeta};
use crate::io::source::ReadFailure;

pub const EXECUTOR_ENDPOINT_UNREACHABLE: &str = "EXECUTOR_ENDPOINT_UNREACHABLE";
pub const EXECUTOR_CAPABILITIES_HTTP_NOT_OK: &str = "EXECUTOR_CAPABILITIES_HTTP_NOT_OK";
pub const EXECUTOR_CAPABILITIES_PARSE_ERROR: &str = "EXECUTOR_CAPABILITIES_PARSE_ERROR";
pub const EXECUTOR_CAPABILITIES_SHAPE_INVALID: &str = "EXECUTOR_CAPABILITIES_SHAPE_INVALID";
pub const EXECUTOR_QUOTE_PARSE_ERROR: &str = "EXECUTOR_QUOTE_PARSE_ERROR";
pub const EXECUTOR_QUOTE_SHAPE_INVALID: &str = "EXECUTOR_QUOTE_SHAPE_INVALID";

fn request(ctx: &CheckContext, path: &str) -> ExecutorRequest {
    ExecutorRequest {
        endpoint: ctx.options.executor_url.clone(),
        path: path.to_string(),
        mock_mode: ctx.options.mock_chain,
    }
}

/// Evidence for one executor read; `extra` fields follow mode/endpoint/url.
fn read_evidence(meta: &HttpReadMeta, basis: &str, extra: Value) -> EvidenceData {
    let mut observed = json!({
        "mode": meta.mode,
        "endpoint": meta.endpoint,
        "request_url": meta.request_url
    });
    if let (Some(observed), Value::Object(extra)) = (observed.as_object_mut(), extra) {
        observed.extend(extra);
    }
    EvidenceData::new(
        EXECUTOR_SOURCE,
        basis,
        RetrievalMarker::request(&meta.retrieved_at, &meta.request_id),
    )
    .observed(observed)
}

fn read_skipped(
    meta: &HttpReadMeta,
    failure: ReadFailure,
    subject: &str,
    summary: &str,
    basis: &str,
) -> RawCheckResult {
    RawCheckResult::skipped(
        failure.reason_code,
        format!("{subject} skipped: {}", failure.details),
        CheckEvidence::new(
            summary,
            read_evidence(meta, basis, json!({})).expected(json!({
                "endpoint_configured": true,
                "transport_reachable": true
            })),
        ),
        EXECUTOR_SOURCE,
    )
}

fn request_url(meta: &HttpReadMeta) -> &str {
    meta.request_url.as_deref().unwrap_or("<unset>")
}

fn string_array(value: Option<&Value>) -> Option<&Vec<Value>> {
    value
        .and_then(Value::as_array)
        .filter(|items| items.iter().all(Value::is_string))
}

fn non_empty_string(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

/// GET on the health path answers 2xx.
pub struct ExecutorEndpointReachability;

impl ExecutorEndpointReachability {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-009-executor-endpoint-reachability",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for ExecutorEndpointReachability {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let read = ctx
            .adapters
            .executor_http
            .get_endpoint_reachability(&request(ctx, &ctx.options.executor_health_path))
            .await;
        let meta = &read.meta;

        let reachability = match read.outcome {
            Ok(reachability) => reachability,
            Err(failure) => {
                return Ok(read_skipped(
                    meta,
                    failure,
                    "Executor endpoint reachability check",
                    "Executor endpoint could not be reached due to configuration or transport degradation.",
                    "Executor endpoint must be configured and transport-reachable for reachability verification.",
                ));
            }
        };

        let status = reachability.http_status;
        let evidence = read_evidence(
            meta,
            "Minimal reachability policy: HTTP GET must return status in 2xx range.",
            json!({ "http_status": status }),
        )
        .expected(json!({ "status_range": "2xx" }));

        let result = if reachability.reachable {
            RawCheckResult::pass(
                format!(
                    "Executor endpoint {} is reachable (HTTP {status}).",
                    request_url(meta)
                ),
                CheckEvidence::new(
                    "Executor endpoint satisfied minimal HTTP reachability policy.",
                    evidence,
                ),
                EXECUTOR_SOURCE,
            )
        } else {
            RawCheckResult::fail(
                EXECUTOR_ENDPOINT_UNREACHABLE,
                format!(
                    "Executor endpoint {} responded with HTTP {status} (expected 2xx).",
                    request_url(meta)
                ),
                CheckEvidence::new(
                    "Executor endpoint responded but failed minimal reachability policy.",
                    evidence,
                ),
                EXECUTOR_SOURCE,
            )
        };
        Ok(result)
    }
}

/// Capabilities payload carries the minimal relay fields.
pub struct ExecutorRelayCapabilities;

impl ExecutorRelayCapabilities {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-010-executor-relay-capabilities",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for ExecutorRelayCapabilities {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let read = ctx
            .adapters
            .executor_http
            .get_relay_capabilities(&request(ctx, &ctx.options.executor_capabilities_path))
            .await;
        let meta = &read.meta;

        let response = match read.outcome {
            Ok(response) => response,
            Err(failure) => {
                return Ok(read_skipped(
                    meta,
                    failure,
                    "Executor capabilities check",
                    "Capabilities endpoint could not be read due to configuration or transport degradation.",
                    "Capabilities validation requires a configured endpoint and a transport-readable capabilities response.",
                ));
            }
        };
        let status = response.http_status;
        let url = request_url(meta);

        if !(200..=299).contains(&status) {
            return Ok(RawCheckResult::fail(
                EXECUTOR_CAPABILITIES_HTTP_NOT_OK,
                format!("Executor capabilities endpoint {url} returned HTTP {status} (expected 2xx)."),
                CheckEvidence::new(
                    "Capabilities endpoint responded but HTTP status is outside minimal acceptable range.",
                    read_evidence(
                        meta,
                        "Capabilities endpoint must respond with HTTP 2xx.",
                        json!({ "http_status": status }),
                    )
                    .expected(json!({ "status_range": "2xx" })),
                ),
                EXECUTOR_SOURCE,
            ));
        }

        let Some(payload) = response.payload_json.as_ref() else {
            return Ok(RawCheckResult::fail(
                EXECUTOR_CAPABILITIES_PARSE_ERROR,
                format!("Executor capabilities endpoint {url} returned non-JSON payload."),
                CheckEvidence::new(
                    "Capabilities payload is not parseable JSON.",
                    read_evidence(
                        meta,
                        "Capabilities payload must be parseable JSON object.",
                        json!({ "http_status": status, "parseable_json": false }),
                    )
                    .expected(json!({ "parseable_json": true })),
                ),
                EXECUTOR_SOURCE,
            ));
        };

        let basis = "Minimal required fields: supported_chains:string[], supported_relay_types:string[], status:string.";
        let chains = string_array(payload.get("supported_chains"));
        let relay_types = string_array(payload.get("supported_relay_types"));
        let executor_status = payload.get("status").and_then(Value::as_str);

        let (Some(chains), Some(relay_types), Some(executor_status)) =
            (chains, relay_types, executor_status)
        else {
            return Ok(RawCheckResult::fail(
                EXECUTOR_CAPABILITIES_SHAPE_INVALID,
                "Capabilities payload is missing required fields/types: supported_chains:string[], supported_relay_types:string[], status:string.",
                CheckEvidence::new(
                    "Capabilities payload parsed but failed minimal shape validation.",
                    read_evidence(
                        meta,
                        basis,
                        json!({
                            "http_status": status,
                            "has_supported_chains": chains.is_some(),
                            "has_supported_relay_types": relay_types.is_some(),
                            "has_status_string": executor_status.is_some()
                        }),
                    )
                    .expected(json!({
                        "supported_chains": "string[]",
                        "supported_relay_types": "string[]",
                        "status": "string"
                    })),
                ),
                EXECUTOR_SOURCE,
            ));
        };

        Ok(RawCheckResult::pass(
            format!("Executor capabilities payload at {url} satisfies minimal shape policy."),
            CheckEvidence::new(
                "Capabilities payload is available and meets minimal field/type requirements.",
                read_evidence(
                    meta,
                    basis,
                    json!({
                        "http_status": status,
                        "supported_chains_count": chains.len(),
                        "supported_relay_types_count": relay_types.len(),
                        "status": executor_status
                    }),
                )
                .expected(json!({
                    "supported_chains_min_count": 0,
                    "supported_relay_types_min_count": 0,
                    "status_type": "string"
                })),
            ),
            EXECUTOR_SOURCE,
        ))
    }
}

/// Quote payload carries non-empty `from_chain`, `to_chain` and `amount_out`.
pub struct ExecutorQuoteSanity;

impl ExecutorQuoteSanity {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-012-executor-quote-sanity",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for ExecutorQuoteSanity {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let read = ctx
            .adapters
            .executor_http
            .get_quote_payload(&request(ctx, &ctx.options.executor_quote_path))
            .await;
        let meta = &read.meta;

        let response = match read.outcome {
            Ok(response) => response,
            Err(failure) => {
                return Ok(read_skipped(
                    meta,
                    failure,
                    "Executor quote sanity check",
                    "Quote payload could not be retrieved due to configuration or transport degradation.",
                    "Quote sanity requires a configured endpoint and a transport-readable quote response.",
                ));
            }
        };
        let url = request_url(meta);

        let Some(payload) = response.payload_json.as_ref() else {
            return Ok(RawCheckResult::fail(
                EXECUTOR_QUOTE_PARSE_ERROR,
                format!("Executor quote payload at {url} is not parseable JSON."),
                CheckEvidence::new(
                    "Quote payload retrieval succeeded but payload is not valid JSON.",
                    read_evidence(
                        meta,
                        "Quote payload must be parseable JSON object.",
                        json!({ "http_status": response.http_status, "parseable_json": false }),
                    )
                    .expected(json!({ "parseable_json": true })),
                ),
                EXECUTOR_SOURCE,
            ));
        };

        let basis = "Minimal quote sanity policy: top-level from_chain, to_chain and amount_out are non-empty strings.";
        let expected = json!({
            "from_chain": "string(non-empty)",
            "to_chain": "string(non-empty)",
            "amount_out": "string(non-empty)"
        });
        let from_chain = non_empty_string(payload.get("from_chain"));
        let to_chain = non_empty_string(payload.get("to_chain"));
        let amount_out = non_empty_string(payload.get("amount_out"));

        let (Some(from_chain), Some(to_chain), Some(amount_out)) = (from_chain, to_chain, amount_out)
        else {
            return Ok(RawCheckResult::fail(
                EXECUTOR_QUOTE_SHAPE_INVALID,
                "Quote payload parsed but failed minimal shape policy: from_chain:string, to_chain:string, amount_out:string (non-empty).",
                CheckEvidence::new(
                    "Quote payload is parseable but missing required top-level fields/types.",
                    read_evidence(
                        meta,
                        basis,
                        json!({
                            "has_from_chain_string": from_chain.is_some(),
                            "has_to_chain_string": to_chain.is_some(),
                            "has_amount_out_string": amount_out.is_some()
                        }),
                    )
                    .expected(expected),
                ),
                EXECUTOR_SOURCE,
            ));
        };

        Ok(RawCheckResult::pass(
            format!("Executor quote payload at {url} satisfies minimal sanity shape policy."),
            CheckEvidence::new(
                "Quote payload is parseable and satisfies minimal top-level shape policy.",
                read_evidence(
                    meta,
                    basis,
                    json!({
                        "from_chain": from_chain,
                        "to_chain": to_chain,
                        "amount_out": amount_out
                    }),
                )
                .expected(expected),
            ),
            EXECUTOR_SOURCE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::types::RuntimeStatus;
    use crate::io::executor_http::ExecutorHttpAdapter;
    use crate::test_support::{ContextBuilder, ScriptedExecutorHttp, TestWorkspace};

    /// Context using the real adapter against a `mock://` endpoint.
    fn mock_context(workspace: &TestWorkspace, endpoint: &str) -> CheckContext {
        let adapter = ExecutorHttpAdapter::new(std::time::Duration::from_millis(500))
            .expect("client");
        ContextBuilder::new(workspace)
            .mock_chain()
            .executor_url(endpoint)
            .executor(Arc::new(adapter))
            .build()
    }

    #[tokio::test]
    async fn reachable_mock_passes_all_executor_checks() {
        let workspace = TestWorkspace::new();
        let ctx = mock_context(&workspace, "mock://executor/reachable");
        for check in [
            &ExecutorEndpointReachability as &dyn Check,
            &ExecutorRelayCapabilities,
            &ExecutorQuoteSanity,
        ] {
            let result = check.run(&ctx).await.expect("run");
            assert_eq!(result.status, RuntimeStatus::Pass, "{}", result.details);
        }
    }

    #[tokio::test]
    async fn unreachable_mock_fails_with_status() {
        let workspace = TestWorkspace::new();
        let ctx = mock_context(&workspace, "mock://executor/unreachable");
        let result = ExecutorEndpointReachability.run(&ctx).await.expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(EXECUTOR_ENDPOINT_UNREACHABLE)
        );
        assert_eq!(
            result.details,
            "Executor endpoint mock://executor/unreachable responded with HTTP 503 (expected 2xx)."
        );
    }

    #[tokio::test]
    async fn missing_endpoint_skips() {
        let workspace = TestWorkspace::new();
        let ctx = ContextBuilder::new(&workspace).build();
        let result = ExecutorEndpointReachability.run(&ctx).await.expect("run");
        assert_eq!(result.status, RuntimeStatus::Skipped);
        assert_eq!(
            result.reason_code.as_deref(),
            Some("EXECUTOR_ENDPOINT_NOT_CONFIGURED")
        );
        assert!(
            result
                .details
                .starts_with("Executor endpoint reachability check skipped: ")
        );
    }

    #[tokio::test]
    async fn capabilities_missing_field_is_shape_invalid() {
        let workspace = TestWorkspace::new();
        let ctx = mock_context(&workspace, "mock://executor/capabilities/missing-field");
        let result = ExecutorRelayCapabilities.run(&ctx).await.expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(EXECUTOR_CAPABILITIES_SHAPE_INVALID)
        );
        let observed = &result.evidence.data.expect("data").observed;
        assert_eq!(observed["has_supported_relay_types"], json!(false));
        assert_eq!(observed["mode"], json!("mock"));
    }

    #[tokio::test]
    async fn capabilities_invalid_json_is_parse_error() {
        let workspace = TestWorkspace::new();
        let ctx = mock_context(&workspace, "mock://executor/capabilities/invalid-json");
        let result = ExecutorRelayCapabilities.run(&ctx).await.expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(EXECUTOR_CAPABILITIES_PARSE_ERROR)
        );
    }

    #[tokio::test]
    async fn capabilities_non_2xx_fails() {
        let workspace = TestWorkspace::new();
        let executor = Arc::new(ScriptedExecutorHttp::new().with_capabilities(500, "{}"));
        let ctx = ContextBuilder::new(&workspace)
            .executor_url("https://executor.example")
            .executor(executor)
            .build();
        let result = ExecutorRelayCapabilities.run(&ctx).await.expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(EXECUTOR_CAPABILITIES_HTTP_NOT_OK)
        );
    }

    #[tokio::test]
    async fn quote_missing_amount_is_shape_invalid() {
        let workspace = TestWorkspace::new();
        let ctx = mock_context(&workspace, "mock://executor/quote/missing-field");
        let result = ExecutorQuoteSanity.run(&ctx).await.expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(EXECUTOR_QUOTE_SHAPE_INVALID)
        );
    }

    #[tokio::test]
    async fn quote_blank_amount_is_shape_invalid() {
        let workspace = TestWorkspace::new();
        let executor = Arc::new(ScriptedExecutorHttp::new().with_quote(
            200,
            r#"{"from_chain":"Solana","to_chain":"Base","amount_out":"  "}"#,
        ));
        let ctx = ContextBuilder::new(&workspace)
            .executor_url("https://executor.example")
            .executor(executor)
            .build();
        let result = ExecutorQuoteSanity.run(&ctx).await.expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(EXECUTOR_QUOTE_SHAPE_INVALID)
        );
    }

    #[tokio::test]
    async fn quote_invalid_json_is_parse_error() {
        let workspace = TestWorkspace::new();
        let ctx = mock_context(&workspace, "mock://executor/quote/invalid-json");
        let result = ExecutorQuoteSanity.run(&ctx).await.expect("run");
        assert_eq!(result.status, RuntimeStatus::Fail);
        assert_eq!(
            result.details,
            "Executor quote payload at mock://executor/quote/invalid-json is not parseable JSON."
        );
    }
}
