use async_trait::async_trait;
use serde_json::json;

use crate::checks::support::{CONFIG_SOURCE, ConfigGate, gate_config};
use crate::checks::{Check, CheckContext};
use crate::core::compute_budget::parse_gas_limit;
use crate::core::peers::json_type_name;
use crate::core::result::{CheckDefinition, CheckEvidence, RawCheckResult};
use crate::core::types::SeverityClass;

pub const COMPUTE_BUDGET_GAS_LIMIT_MISSING: &str = "COMPUTE_BUDGET_GAS_LIMIT_MISSING";
pub const COMPUTE_BUDGET_GAS_LIMIT_UNPARSEABLE: &str = "COMPUTE_BUDGET_GAS_LIMIT_UNPARSEABLE";
pub const COMPUTE_BUDGET_BELOW_MINIMUM: &str = "COMPUTE_BUDGET_BELOW_MINIMUM";

/// Configured `gasLimit` covers the documented redeem compute units plus buffer.
pub struct ComputeBudgetSanity;

impl ComputeBudgetSanity {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-013-compute-budget-sanity",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for ComputeBudgetSanity {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let document = match gate_config(
            ctx,
            ConfigGate {
                check: "Compute budget sanity",
                basis: "Compute budget sanity requires readable config intent source with gasLimit value.",
                expected: json!({ "config_readable": true, "parseable_json": true }),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };

        let Some(raw) = document.root.get("gasLimit") else {
            return Ok(RawCheckResult::skipped(
                COMPUTE_BUDGET_GAS_LIMIT_MISSING,
                "Compute budget sanity skipped: required config field gasLimit is missing.",
                CheckEvidence::new(
                    "gasLimit is missing; cannot statically assess compute budget threshold.",
                    document
                        .evidence("Static compute budget sanity requires configured gasLimit to compare against documented threshold.")
                        .observed(json!({ "config_path": document.path, "has_gas_limit": false }))
                        .expected(json!({ "has_gas_limit": true })),
                ),
                CONFIG_SOURCE,
            ));
        };

        let Some(gas_limit) = parse_gas_limit(raw) else {
            return Ok(RawCheckResult::skipped(
                COMPUTE_BUDGET_GAS_LIMIT_UNPARSEABLE,
                "Compute budget sanity skipped: gasLimit is not an integer-like value.",
                CheckEvidence::new(
                    "gasLimit value is present but not parseable as integer.",
                    document
                        .evidence("Static compute budget sanity compares integer gasLimit against static threshold.")
                        .observed(json!({
                            "config_path": document.path,
                            "gas_limit_type": json_type_name(raw)
                        }))
                        .expected(json!({ "gas_limit_type": "integer | numeric string" })),
                ),
                CONFIG_SOURCE,
            ));
        };

        let policy = ctx.settings.compute_budget;
        let required = policy.required_minimum();
        let observed = json!({
            "configuredGasLimit": gas_limit,
            "requiredMinimum": required,
            "baseMinimum": policy.base_minimum,
            "bufferMultiplier": policy.buffer_multiplier(),
            "source": "NTT documented redeem CU (static)"
        });
        let expected = json!({ "gasLimit_gte": required });
        let basis = "configured gasLimit must satisfy requiredMinimum = ceil(baseMinimum * buffer).";

        let result = if policy.is_satisfied_by(gas_limit) {
            RawCheckResult::pass(
                format!("Configured gasLimit ({gas_limit}) satisfies required minimum ({required})."),
                CheckEvidence::new(
                    "Configured gasLimit satisfies static safety threshold.",
                    document.evidence(basis).observed(observed).expected(expected),
                ),
                CONFIG_SOURCE,
            )
        } else {
            RawCheckResult::fail(
                COMPUTE_BUDGET_BELOW_MINIMUM,
                format!("Configured gasLimit ({gas_limit}) is below required minimum ({required})."),
                CheckEvidence::new(
                    "Configured gasLimit is below static safety threshold (documented minimum x buffer).",
                    document.evidence(basis).observed(observed).expected(expected),
                ),
                CONFIG_SOURCE,
            )
        };
        Ok(result)
    }
}
