use async_trait::async_trait;
use serde_json::json;

use crate::checks::{Check, CheckContext};
use crate::core::result::{
    CheckDefinition, CheckEvidence, EvidenceData, RawCheckResult, RetrievalMarker,
};
use crate::core::types::SeverityClass;
use crate::io::solana_rpc::{HealthResponse, RPC_HEALTH_SOURCE};

pub const RPC_HEALTH_NOT_OK: &str = "RPC_HEALTH_NOT_OK";

/// Solana RPC `getHealth` answers `"ok"`.
pub struct SolanaRpcHealth;

impl SolanaRpcHealth {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-002-solana-rpc-health-readiness",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for SolanaRpcHealth {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let health = ctx.adapters.solana_read.get_health().await;
        let meta = health.meta;
        let marker = RetrievalMarker::request(meta.retrieved_at, meta.request_id);
        let basis = "RPC getHealth result must equal 'ok'.";

        let result = match health.outcome {
            Err(failure) => RawCheckResult::skipped(
                failure.reason_code,
                format!("Solana RPC unavailable: {}", failure.details),
                CheckEvidence::new(
                    "Unable to retrieve Solana RPC health response.",
                    EvidenceData::new(
                        RPC_HEALTH_SOURCE,
                        "Solana RPC must be reachable to run on-chain checks.",
                        marker,
                    )
                    .observed(json!({ "endpoint": meta.endpoint })),
                ),
                RPC_HEALTH_SOURCE,
            ),
            Ok(HealthResponse::Result(result)) if result == "ok" => RawCheckResult::pass(
                "Solana RPC health returned ok.",
                CheckEvidence::new(
                    "Solana RPC endpoint is healthy for read-only operations.",
                    EvidenceData::new(RPC_HEALTH_SOURCE, basis, marker)
                        .observed(json!({ "endpoint": meta.endpoint, "health_result": result })),
                ),
                RPC_HEALTH_SOURCE,
            ),
            Ok(HealthResponse::Result(result)) => RawCheckResult::fail(
                RPC_HEALTH_NOT_OK,
                format!("Unexpected health result: {result}"),
                CheckEvidence::new(
                    "Solana RPC endpoint responded but health assertion failed.",
                    EvidenceData::new(RPC_HEALTH_SOURCE, basis, marker)
                        .observed(json!({
                            "endpoint": meta.endpoint,
                            "response_kind": "result",
                            "health_result": result,
                            "rpc_error": null
                        }))
                        .expected(json!({ "health_result": "ok" })),
                ),
                RPC_HEALTH_SOURCE,
            ),
            Ok(HealthResponse::Error { code, message }) => RawCheckResult::fail(
                RPC_HEALTH_NOT_OK,
                format!("Solana RPC reported error {code}: {message}"),
                CheckEvidence::new(
                    "Solana RPC endpoint responded but health assertion failed.",
                    EvidenceData::new(RPC_HEALTH_SOURCE, basis, marker)
                        .observed(json!({
                            "endpoint": meta.endpoint,
                            "response_kind": "error",
                            "health_result": null,
                            "rpc_error": { "code": code, "message": message }
                        }))
                        .expected(json!({ "health_result": "ok" })),
                ),
                RPC_HEALTH_SOURCE,
            ),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::types::RuntimeStatus;
    use crate::io::source::ReadFailure;
    use crate::test_support::{ContextBuilder, ScriptedSolanaRead, TestWorkspace};

    async fn run_with(health: Result<HealthResponse, ReadFailure>) -> RawCheckResult {
        let workspace = TestWorkspace::new();
        let solana = Arc::new(ScriptedSolanaRead::new().with_health(health));
        let ctx = ContextBuilder::new(&workspace).solana(solana).build();
        SolanaRpcHealth.run(&ctx).await.expect("run")
    }

    #[tokio::test]
    async fn ok_result_passes() {
        let result = run_with(Ok(HealthResponse::Result("ok".to_string()))).await;
        assert_eq!(result.status, RuntimeStatus::Pass);
        assert_eq!(result.source, RPC_HEALTH_SOURCE);
    }

    #[tokio::test]
    async fn rpc_error_fails_with_code_and_message() {
        let result = run_with(Ok(HealthResponse::Error {
            code: -32005,
            message: "Node is behind by 42 slots".to_string(),
        }))
        .await;
        assert_eq!(result.status, RuntimeStatus::Fail);
        assert_eq!(
            result.details,
            "Solana RPC reported error -32005: Node is behind by 42 slots"
        );
    }

    #[tokio::test]
    async fn timeout_is_skipped_and_degraded() {
        let result = run_with(Err(ReadFailure::new(
            "RPC_TIMEOUT",
            "RPC timeout after 5000ms.",
        )))
        .await;
        assert_eq!(result.status, RuntimeStatus::Skipped);
        assert_eq!(result.reason_code.as_deref(), Some("RPC_TIMEOUT"));
        assert_eq!(result.details, "Solana RPC unavailable: RPC timeout after 5000ms.");
        assert!(result.degradation);
    }
}
