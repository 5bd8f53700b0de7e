//! Both directions of every expected pair agree on token decimals.

use async_trait::async_trait;
use serde_json::json;

use crate::checks::registration_source::registration_source_for;
use crate::checks::support::{ConfigGate, FIXTURE_SOURCE, expected_peer_pairs, gate_config};
use crate::checks::{Check, CheckContext};
use crate::core::correlation::{DecimalsOutcome, decimals_mismatch_line, evaluate_decimals};
use crate::core::result::{
    CheckDefinition, CheckEvidence, EvidenceData, RawCheckResult, RetrievalMarker,
};
use crate::core::types::SeverityClass;
use crate::io::source::now_timestamp;

pub const MOCK_CHAIN_DISABLED: &str = "MOCK_CHAIN_DISABLED";
pub const NTT_DECIMALS_REGISTRATION_MISSING: &str = "NTT_DECIMALS_REGISTRATION_MISSING";
pub const NTT_DECIMALS_MISMATCH: &str = "NTT_DECIMALS_MISMATCH";

pub struct DecimalsSync;

impl DecimalsSync {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-008-decimals-sync",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for DecimalsSync {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let source = registration_source_for(&ctx.options);
        if !source.provides_decimals() {
            return Ok(RawCheckResult::skipped(
                MOCK_CHAIN_DISABLED,
                "Decimals sync requires a registration source that carries decimals (--mock-chain).",
                CheckEvidence::new(
                    "Active registration source is existence-only; decimals were not compared.",
                    EvidenceData::new(
                        FIXTURE_SOURCE,
                        "Decimals are compared from registration records that carry decimals metadata.",
                        RetrievalMarker::at(now_timestamp()),
                    )
                    .observed(json!({
                        "mode": source.mode(),
                        "mock_chain_enabled": ctx.options.mock_chain,
                        "mock_chain_path": ctx.options.mock_chain_path
                    }))
                    .expected(json!({ "mock_chain_enabled": true })),
                ),
                FIXTURE_SOURCE,
            ));
        }

        let config = match gate_config(
            ctx,
            ConfigGate {
                check: "Decimals sync check",
                basis: "Expected peer pairs come from top-level config peers mapping.",
                expected: json!({ "config_readable": true, "parseable_json": true }),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };
        let pairs = match expected_peer_pairs(ctx, &config, "decimals-sync") {
            Ok(pairs) => pairs,
            Err(verdict) => return Ok(*verdict),
        };
        let load = match source.load(ctx, &config, &pairs).await {
            Ok(load) => load,
            Err(verdict) => return Ok(*verdict),
        };

        let evidence = |basis: &str| {
            EvidenceData::new(load.source, basis, load.retrieval_marker.clone())
        };
        let result = match evaluate_decimals(&pairs, &load.snapshot) {
            DecimalsOutcome::RegistrationMissing {
                pair,
                forward_registered,
                reverse_registered,
            } => RawCheckResult::fail(
                NTT_DECIMALS_REGISTRATION_MISSING,
                format!(
                    "Missing required registration record(s) for decimals comparison: {}",
                    pair.title()
                ),
                CheckEvidence::new(
                    "Cannot compare decimals because directional registration record is missing.",
                    evidence("Both directions must have registered records before decimals comparison.")
                        .observed(json!({
                            "checked_pair": pair.label(),
                            "forward_present": forward_registered.is_some(),
                            "reverse_present": reverse_registered.is_some(),
                            "forward_registered": forward_registered,
                            "reverse_registered": reverse_registered
                        }))
                        .expected(json!({
                            "forward_registered": true,
                            "reverse_registered": true
                        })),
                ),
                load.source,
            ),
            DecimalsOutcome::DecimalsMissing {
                pair,
                forward_decimals,
                reverse_decimals,
            } => RawCheckResult::fail(
                NTT_DECIMALS_REGISTRATION_MISSING,
                format!(
                    "Missing decimals metadata for comparison at pair {}",
                    pair.title()
                ),
                CheckEvidence::new(
                    "Directional registrations exist but decimals metadata is incomplete.",
                    evidence("Both directional registrations must provide decimals for comparison.")
                        .observed(json!({
                            "checked_pair": pair.label(),
                            "forward_decimals": forward_decimals,
                            "reverse_decimals": reverse_decimals
                        }))
                        .expected(json!({
                            "forward_decimals_type": "number",
                            "reverse_decimals_type": "number"
                        })),
                ),
                load.source,
            ),
            DecimalsOutcome::Mismatch {
                pair,
                forward_decimals,
                reverse_decimals,
            } => {
                let line = decimals_mismatch_line(&pair, &forward_decimals, &reverse_decimals);
                RawCheckResult::fail(
                    NTT_DECIMALS_MISMATCH,
                    line.clone(),
                    CheckEvidence::new(
                        "Detected decimals mismatch across registration directions.",
                        evidence("Directional registration decimals must be equal for each expected pair.")
                            .observed(json!({
                                "checked_pair": pair.label(),
                                "first_failing_pair": pair.label(),
                                "forward_decimals": forward_decimals,
                                "reverse_decimals": reverse_decimals,
                                "root_cause_line": line
                            }))
                            .expected(json!({ "decimals_equal": true })),
                    ),
                    load.source,
                )
            }
            DecimalsOutcome::Synced { checked_pairs } => RawCheckResult::pass(
                "All expected peer pairs have matching decimals in mock-chain fixture.",
                CheckEvidence::new(
                    "No decimals mismatch detected for expected peer registration pairs.",
                    evidence("Directional registration decimals must be equal for each expected pair.")
                        .observed(json!({
                            "local_chain": ctx.settings.local_chain,
                            "checked_pairs": checked_pairs
                        }))
                        .expected(json!({ "decimals_equal": true })),
                ),
                load.source,
            ),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RuntimeStatus;
    use crate::test_support::{ContextBuilder, ScriptedSolanaRead, TestWorkspace};

    const EVM: &str = "0x1111111111111111111111111111111111111111";

    #[tokio::test]
    async fn mismatch_quotes_both_decimals() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "eth": EVM } }));
        workspace.write_fixture(&json!({
            "registrations": [
                { "from": "solana", "to": "eth", "registered": true, "decimals": 9 },
                { "from": "eth", "to": "solana", "registered": true, "decimals": 6 }
            ]
        }));
        let ctx = ContextBuilder::new(&workspace).mock_chain().build();

        let result = DecimalsSync.run(&ctx).await.expect("run");
        assert_eq!(result.status, RuntimeStatus::Fail);
        assert_eq!(result.reason_code.as_deref(), Some(NTT_DECIMALS_MISMATCH));
        assert_eq!(
            result.details,
            "Solana->Eth decimals=9 / Eth->Solana decimals=6 (MISMATCH)"
        );
        assert!(result.details.contains('9') && result.details.contains('6'));
    }

    #[tokio::test]
    async fn unregistered_direction_is_reported_before_decimals() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "eth": EVM } }));
        workspace.write_fixture(&json!({
            "registrations": [
                { "from": "solana", "to": "eth", "registered": true, "decimals": 9 },
                { "from": "eth", "to": "solana", "registered": false, "decimals": 6 }
            ]
        }));
        let ctx = ContextBuilder::new(&workspace).mock_chain().build();

        let result = DecimalsSync.run(&ctx).await.expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(NTT_DECIMALS_REGISTRATION_MISSING)
        );
        assert_eq!(
            result.details,
            "Missing required registration record(s) for decimals comparison: Solana<->Eth"
        );
    }

    #[tokio::test]
    async fn missing_decimals_metadata_fails() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "eth": EVM } }));
        workspace.write_fixture(&json!({
            "registrations": [
                { "from": "solana", "to": "eth", "registered": true, "decimals": 9 },
                { "from": "eth", "to": "solana", "registered": true }
            ]
        }));
        let ctx = ContextBuilder::new(&workspace).mock_chain().build();

        let result = DecimalsSync.run(&ctx).await.expect("run");
        assert_eq!(
            result.details,
            "Missing decimals metadata for comparison at pair Solana<->Eth"
        );
    }

    #[tokio::test]
    async fn matching_decimals_pass() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "eth": EVM } }));
        workspace.write_fixture(&json!({
            "registrations": [
                { "from": "solana", "to": "eth", "registered": true, "decimals": 8 },
                { "from": "eth", "to": "solana", "registered": true, "decimals": 8.0 }
            ]
        }));
        let ctx = ContextBuilder::new(&workspace).mock_chain().build();

        let result = DecimalsSync.run(&ctx).await.expect("run");
        assert_eq!(result.status, RuntimeStatus::Pass);
    }

    #[tokio::test]
    async fn rpc_source_is_skipped_before_any_read() {
        let workspace = TestWorkspace::new();
        let solana = std::sync::Arc::new(ScriptedSolanaRead::new());
        let ctx = ContextBuilder::new(&workspace).solana(solana.clone()).build();

        let result = DecimalsSync.run(&ctx).await.expect("run");
        assert_eq!(result.status, RuntimeStatus::Skipped);
        assert_eq!(result.reason_code.as_deref(), Some(MOCK_CHAIN_DISABLED));
        assert!(result.degradation);
        assert!(solana.peer_queries().is_empty());
    }
}
