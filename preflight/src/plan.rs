//! Transaction plan derived from check results.
//!
//! The plan only describes remediation; it never constructs, signs or submits
//! a transaction.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::core::result::CheckResult;
use crate::core::types::{ProfileName, RuntimeStatus};
use crate::io::artifacts::{TX_PLAN_JSON_FILE, TX_PLAN_MARKDOWN_FILE, artifact_path, write_json, write_text};

const TX_PLAN_TEMPLATE: &str = include_str!("templates/tx_plan.md");

const READ_ONLY_ASSUMPTION: &str =
    "Preflight mode is read-only and does not sign or execute transactions.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPlanStep {
    pub id: String,
    pub description: String,
    pub requires_signature: bool,
}

/// Contents of `tx-plan.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPlan {
    pub generated_at: String,
    pub profile: ProfileName,
    pub assumptions: Vec<String>,
    pub steps: Vec<TxPlanStep>,
}

/// Plan without check results: assumptions only.
pub fn build_skeleton(generated_at: String, profile: ProfileName) -> TxPlan {
    TxPlan {
        generated_at,
        profile,
        assumptions: vec![
            "No registration source was evaluated; rerun with --mock-chain to derive remediation steps.".to_string(),
            READ_ONLY_ASSUMPTION.to_string(),
        ],
        steps: Vec::new(),
    }
}

/// One remediation step per FAIL, in result order. SKIPPED results become
/// assumptions since their source was never assessed.
pub fn build_from_results(
    generated_at: String,
    profile: ProfileName,
    results: &[CheckResult],
) -> TxPlan {
    let mut assumptions = vec![
        "Registration state is taken from the mock-chain fixture, not from live chain state."
            .to_string(),
        READ_ONLY_ASSUMPTION.to_string(),
    ];
    let mut steps = Vec::new();
    for result in results {
        match result.status {
            RuntimeStatus::Pass => {}
            RuntimeStatus::Skipped => assumptions.push(format!(
                "{} was not assessed ({}): {}",
                result.check_id,
                result.reason_code.as_deref().unwrap_or("UNKNOWN"),
                result.details
            )),
            RuntimeStatus::Fail => {
                let (action, requires_signature) = remediation(result);
                steps.push(TxPlanStep {
                    id: format!("step-{:02}-{}", steps.len() + 1, short_check_id(&result.check_id)),
                    description: format!("{action} Cause: {}", result.details),
                    requires_signature,
                });
            }
        }
    }
    TxPlan {
        generated_at,
        profile,
        assumptions,
        steps,
    }
}

/// `CHK-007-peer-registration-symmetry` -> `chk-007`.
fn short_check_id(check_id: &str) -> String {
    check_id
        .splitn(3, '-')
        .take(2)
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Remediation action for a failed check, and whether it needs an on-chain
/// signature.
fn remediation(result: &CheckResult) -> (&'static str, bool) {
    let reason = result.reason_code.as_deref().unwrap_or_default();
    match reason {
        "NTT_PEER_REGISTRATION_ASYMMETRY" => (
            "Register the missing peer direction with the NTT manager (setPeer) so both directions agree.",
            true,
        ),
        "NTT_DECIMALS_REGISTRATION_MISSING" => (
            "Register both peer directions with token decimals before comparing decimals.",
            true,
        ),
        "NTT_DECIMALS_MISMATCH" => (
            "Re-register the peer whose decimals differ so both directions carry the same token decimals.",
            true,
        ),
        "NTT_MANAGER_PROGRAM_ID_MISSING" | "NTT_MANAGER_PROGRAM_ID_INVALID" => (
            "Set manager.solanaProgramId in config to the deployed base58 NTT manager program id.",
            false,
        ),
        "NTT_CHAIN_ID_MAPPING_UNSUPPORTED" => (
            "Rename the peer key to a supported chain or add its Wormhole chain id to the verifier settings.",
            false,
        ),
        "COMPUTE_BUDGET_BELOW_MINIMUM" => (
            "Raise gasLimit in config to at least the required compute budget minimum.",
            false,
        ),
        "RPC_HEALTH_NOT_OK" => (
            "Point --rpc-url at a healthy Solana RPC endpoint before deploying.",
            false,
        ),
        _ if result.check_id.starts_with("CHK-011") => (
            "Add the executor transceiver reference to executor.transceivers in config.",
            false,
        ),
        _ if reason.starts_with("NTT_PEER_MAPPING") => (
            "Fix the peers mapping in config: non-empty object of lowercase chain keys to peer addresses.",
            false,
        ),
        _ if reason.starts_with("EXECUTOR_") => (
            "Fix the executor endpoint or its responses before relying on executor relaying.",
            false,
        ),
        _ => ("Fix the reported configuration or fixture problem.", false),
    }
}

/// Render `tx-plan.md`.
pub fn render_markdown(plan: &TxPlan) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("tx_plan.md", TX_PLAN_TEMPLATE)
        .context("load tx plan template")?;
    let template = env.get_template("tx_plan.md")?;
    let mut rendered = template
        .render(context! { plan => plan })
        .context("render tx plan")?;
    rendered.push('\n');
    Ok(rendered)
}

/// Write `tx-plan.md` and `tx-plan.json`; returns their paths in that order.
pub fn write_tx_plan_artifacts(output_dir: &Path, plan: &TxPlan) -> Result<(PathBuf, PathBuf)> {
    let markdown_path = artifact_path(output_dir, TX_PLAN_MARKDOWN_FILE);
    let json_path = artifact_path(output_dir, TX_PLAN_JSON_FILE);
    write_json(&json_path, plan)?;
    write_text(&markdown_path, &render_markdown(plan)?)?;
    Ok((markdown_path, json_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::{CheckDefinition, CheckEvidence, RawCheckResult};
    use crate::core::types::SeverityClass;

    fn result(id: &'static str, raw: RawCheckResult) -> CheckResult {
        let definition = CheckDefinition {
            id,
            severity_class: SeverityClass::Blocking,
            deterministic: true,
        };
        CheckResult::normalize(ProfileName::NttGeneric, &definition, raw)
    }

    fn sample_results() -> Vec<CheckResult> {
        vec![
            result(
                "CHK-001-config-intent-source-readiness",
                RawCheckResult::pass("ok", CheckEvidence::summary_only("ok"), "stub"),
            ),
            result(
                "CHK-007-peer-registration-symmetry",
                RawCheckResult::fail(
                    "NTT_PEER_REGISTRATION_ASYMMETRY",
                    "Solana->Eth: REGISTERED / Eth->Solana: MISSING",
                    CheckEvidence::summary_only("asymmetric"),
                    "stub",
                ),
            ),
            result(
                "CHK-002-solana-rpc-health-readiness",
                RawCheckResult::skipped(
                    "RPC_TIMEOUT",
                    "Solana RPC unavailable: timeout",
                    CheckEvidence::summary_only("down"),
                    "stub",
                ),
            ),
        ]
    }

    #[test]
    fn failures_become_steps_and_skips_become_assumptions() {
        let plan = build_from_results("t0".to_string(), ProfileName::NttGeneric, &sample_results());

        assert_eq!(plan.steps.len(), 1);
        let step = &plan.steps[0];
        assert_eq!(step.id, "step-01-chk-007");
        assert!(step.requires_signature);
        assert!(
            step.description
                .ends_with("Cause: Solana->Eth: REGISTERED / Eth->Solana: MISSING")
        );
        assert!(plan.assumptions.contains(
            &"CHK-002-solana-rpc-health-readiness was not assessed (RPC_TIMEOUT): Solana RPC unavailable: timeout".to_string()
        ));
    }

    #[test]
    fn skeleton_has_no_steps() {
        let plan = build_skeleton("t0".to_string(), ProfileName::SunriseExecutor);
        assert!(plan.steps.is_empty());
        assert!(plan.assumptions.iter().any(|a| a == READ_ONLY_ASSUMPTION));
        let markdown = render_markdown(&plan).expect("render");
        assert!(markdown.starts_with("# tx-plan\n"));
        assert!(markdown.contains("- profile: sunrise-executor"));
        assert!(markdown.contains("- No steps generated."));
    }

    #[test]
    fn markdown_lists_steps() {
        let plan = build_from_results("t0".to_string(), ProfileName::NttGeneric, &sample_results());
        let markdown = render_markdown(&plan).expect("render");
        assert!(
            markdown.contains("1. `step-01-chk-007` (signature required): Register the missing peer direction"),
            "{markdown}"
        );
        assert!(!markdown.contains("No steps generated"));
        assert!(markdown.ends_with('\n'));
    }

    #[test]
    fn artifacts_are_written_side_by_side() {
        let temp = tempfile::tempdir().expect("tempdir");
        let plan = build_skeleton("t0".to_string(), ProfileName::NttGeneric);
        let (markdown, json) = write_tx_plan_artifacts(temp.path(), &plan).expect("write");
        assert!(markdown.ends_with(TX_PLAN_MARKDOWN_FILE));
        let decoded: TxPlan =
            serde_json::from_str(&std::fs::read_to_string(json).expect("read")).expect("decode");
        assert_eq!(decoded, plan);
    }
}
