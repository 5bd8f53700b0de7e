//! Every expected peer pair is registered in both directions, or in neither.

use async_trait::async_trait;
use serde_json::json;

use crate::checks::registration_source::registration_source_for;
use crate::checks::support::{ConfigGate, expected_peer_pairs, gate_config};
use crate::checks::{Check, CheckContext};
use crate::core::correlation::{SymmetryOutcome, asymmetry_line, evaluate_symmetry};
use crate::core::result::{CheckDefinition, CheckEvidence, EvidenceData, RawCheckResult};
use crate::core::types::SeverityClass;

pub const NTT_PEER_REGISTRATION_ASYMMETRY: &str = "NTT_PEER_REGISTRATION_ASYMMETRY";

pub struct PeerRegistrationSymmetry;

impl PeerRegistrationSymmetry {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-007-peer-registration-symmetry",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for PeerRegistrationSymmetry {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let config = match gate_config(
            ctx,
            ConfigGate {
                check: "Peer registration symmetry check",
                basis: "Expected peer pairs come from top-level config peers mapping.",
                expected: json!({ "config_readable": true, "parseable_json": true }),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };
        let pairs = match expected_peer_pairs(ctx, &config, "symmetry") {
            Ok(pairs) => pairs,
            Err(verdict) => return Ok(*verdict),
        };

        let source = registration_source_for(&ctx.options);
        let load = match source.load(ctx, &config, &pairs).await {
            Ok(load) => load,
            Err(verdict) => return Ok(*verdict),
        };

        let result = match evaluate_symmetry(&pairs, &load.snapshot) {
            SymmetryOutcome::Asymmetric {
                pair,
                forward_registered,
                reverse_registered,
            } => {
                let line = asymmetry_line(&pair, forward_registered, reverse_registered);
                RawCheckResult::fail(
                    NTT_PEER_REGISTRATION_ASYMMETRY,
                    line.clone(),
                    CheckEvidence::new(
                        format!(
                            "Detected asymmetric peer registration state ({} source).",
                            source.mode()
                        ),
                        EvidenceData::new(
                            load.source,
                            "For each expected pair, registration must be symmetric in both directions.",
                            load.retrieval_marker,
                        )
                        .observed(json!({
                            "mode": source.mode(),
                            "checked_pair": pair.label(),
                            "first_failing_pair": pair.label(),
                            "forward_registered": forward_registered,
                            "reverse_registered": reverse_registered,
                            "root_cause_line": line
                        }))
                        .expected(json!({ "symmetric_registration": true })),
                    ),
                    load.source,
                )
            }
            SymmetryOutcome::Symmetric { checked_pairs } => {
                let details = if source.provides_decimals() {
                    "All expected peer pairs are symmetrically registered in mock-chain fixture."
                } else {
                    "All expected peer pairs are symmetrically registered in rpc mode (existence-only)."
                };
                RawCheckResult::pass(
                    details,
                    CheckEvidence::new(
                        "No asymmetry detected for expected peer registration pairs.",
                        EvidenceData::new(
                            load.source,
                            "For each expected pair, local->peer and peer->local registration states must match.",
                            load.retrieval_marker,
                        )
                        .observed(json!({
                            "local_chain": ctx.settings.local_chain,
                            "mode": source.mode(),
                            "checked_pairs": checked_pairs
                        }))
                        .expected(json!({ "symmetric_registration": true })),
                    ),
                    load.source,
                )
            }
        };
        Ok(result)
    }
}
