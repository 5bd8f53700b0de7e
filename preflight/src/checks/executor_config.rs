//! The executor transceiver named in config appears in `executor.transceivers`.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::checks::support::{CONFIG_SOURCE, ConfigGate, gate_config};
use crate::checks::{Check, CheckContext};
use crate::core::peers::json_type_name;
use crate::core::result::{CheckDefinition, CheckEvidence, RawCheckResult};
use crate::core::types::SeverityClass;

pub const EXECUTOR_TRANSCEIVER_CONFIG_MISSING: &str = "EXECUTOR_TRANSCEIVER_CONFIG_MISSING";
pub const EXECUTOR_TRANSCEIVER_REFERENCE_MISSING: &str = "EXECUTOR_TRANSCEIVER_REFERENCE_MISSING";
pub const EXECUTOR_TRANSCEIVER_CONFIG_EMPTY: &str = "EXECUTOR_TRANSCEIVER_CONFIG_EMPTY";
pub const EXECUTOR_TRANSCEIVER_CONFIG_SHAPE_INVALID: &str =
    "EXECUTOR_TRANSCEIVER_CONFIG_SHAPE_INVALID";
pub const EXECUTOR_TRANSCEIVER_NOT_PRESENT: &str = "EXECUTOR_TRANSCEIVER_NOT_PRESENT";

/// Reference carried by one `transceivers` entry: a string, or an object
/// with `address` (preferred) or `reference`.
fn entry_reference(entry: &Value) -> Result<&str, &'static str> {
    match entry {
        Value::String(text) => {
            let reference = text.trim();
            if reference.is_empty() {
                Err("string entry must be non-empty after trim")
            } else {
                Ok(reference)
            }
        }
        Value::Object(obj) => {
            let field = |name: &str| {
                obj.get(name)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
            };
            field("address")
                .or_else(|| field("reference"))
                .ok_or("object entry must include non-empty address or reference string")
        }
        _ => Err("entry must be string or object with address/reference"),
    }
}

pub struct ExecutorTransceiverConfigPresence;

impl ExecutorTransceiverConfigPresence {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-011-executor-transceiver-config-presence",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for ExecutorTransceiverConfigPresence {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let document = match gate_config(
            ctx,
            ConfigGate {
                check: "Executor transceiver config presence",
                basis: "Executor transceiver config presence requires readable config intent source.",
                expected: json!({ "config_readable": true, "parseable_json": true }),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };
        let fail = |reason_code: &str,
                    details: String,
                    summary: &str,
                    basis: &str,
                    observed: Value,
                    expected: Value| {
            RawCheckResult::fail(
                reason_code,
                details,
                CheckEvidence::new(
                    summary,
                    document.evidence(basis).observed(observed).expected(expected),
                ),
                CONFIG_SOURCE,
            )
        };

        let Some(section) = document
            .root
            .get("executor")
            .and_then(Value::as_object)
        else {
            return Ok(fail(
                EXECUTOR_TRANSCEIVER_CONFIG_MISSING,
                "Missing required executor config section.".to_string(),
                "Executor config section is missing.",
                "Config must include executor section with transceiverAddress and transceivers entries.",
                json!({ "has_executor_section": false }),
                json!({ "has_executor_section": true }),
            ));
        };

        let address = section.get("transceiverAddress").and_then(Value::as_str);
        let reference = section.get("transceiverReference").and_then(Value::as_str);
        let required = address.or(reference).map(str::trim).unwrap_or_default();
        if required.is_empty() {
            return Ok(fail(
                EXECUTOR_TRANSCEIVER_REFERENCE_MISSING,
                "Missing required executor transceiver reference (executor.transceiverAddress or executor.transceiverReference).".to_string(),
                "Executor transceiver required reference is missing.",
                "Config must include expected executor transceiver reference to validate presence.",
                json!({
                    "has_transceiver_address": address.is_some(),
                    "has_transceiver_reference": reference.is_some()
                }),
                json!({ "required_reference_present": true }),
            ));
        }

        let transceivers = section.get("transceivers");
        let Some(entries) = transceivers.and_then(Value::as_array) else {
            return Ok(fail(
                EXECUTOR_TRANSCEIVER_CONFIG_MISSING,
                "Missing required executor.transceivers array.".to_string(),
                "Executor transceivers section is missing or not an array.",
                "Config must include executor.transceivers array for transceiver presence verification.",
                json!({
                    "transceivers_type": transceivers.map_or("undefined", json_type_name),
                    "transceivers_is_array": false
                }),
                json!({ "transceivers_type": "array" }),
            ));
        };
        if entries.is_empty() {
            return Ok(fail(
                EXECUTOR_TRANSCEIVER_CONFIG_EMPTY,
                "executor.transceivers array is empty.".to_string(),
                "Executor transceivers section exists but has no entries.",
                "At least one transceiver entry must be present before checking required executor reference.",
                json!({ "transceivers_count": 0 }),
                json!({ "transceivers_count_min": 1 }),
            ));
        }

        let mut available = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            match entry_reference(entry) {
                Ok(reference) => available.push(reference),
                Err(details) => {
                    return Ok(fail(
                        EXECUTOR_TRANSCEIVER_CONFIG_SHAPE_INVALID,
                        format!("Invalid executor.transceivers[{idx}] shape: {details}."),
                        "Executor transceiver entry has invalid minimal shape.",
                        "Each transceiver entry must be string or object with non-empty address/reference.",
                        json!({ "invalid_index": idx }),
                        json!({
                            "entry_shape": "string | { address: string } | { reference: string }"
                        }),
                    ));
                }
            }
        }

        if !available.contains(&required) {
            return Ok(fail(
                EXECUTOR_TRANSCEIVER_NOT_PRESENT,
                format!(
                    "Required executor transceiver reference '{required}' is not present in executor.transceivers."
                ),
                "Required executor transceiver reference is missing from transceivers list.",
                "executor.transceivers must include the required executor transceiver reference from config.",
                json!({
                    "required_reference": required,
                    "available_references": available
                }),
                json!({ "required_reference_present": true }),
            ));
        }

        Ok(RawCheckResult::pass(
            format!("Executor transceiver config presence confirmed: '{required}' is present."),
            CheckEvidence::new(
                "Executor transceiver config contains the required executor transceiver reference.",
                document
                    .evidence(
                        "executor.transceivers must include executor.transceiverAddress/reference value.",
                    )
                    .observed(json!({
                        "required_reference": required,
                        "transceivers_count": available.len()
                    }))
                    .expected(json!({ "required_reference_present": true })),
            ),
            CONFIG_SOURCE,
        ))
    }
}
