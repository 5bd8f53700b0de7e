//! Shape sanity of the `peers` section: keys and values.
//!
//! Both checks share the section rules (missing, non-object, empty) and then
//! report the first offending entry in declaration order.

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::checks::config_intent::NTT_PEER_MAPPING_EMPTY;
use crate::checks::support::{
    CONFIG_SOURCE, ConfigGate, Document, NTT_PEER_MAPPING_MISSING, gate_config,
};
use crate::checks::{Check, CheckContext};
use crate::core::peers::{
    KEY_RULES, PeerSection, VALUE_RULES, json_type_name, peer_section, validate_peer_key,
    validate_peer_value,
};
use crate::core::result::{CheckDefinition, CheckEvidence, RawCheckResult};
use crate::core::types::SeverityClass;

pub const NTT_PEER_MAPPING_SHAPE_INVALID: &str = "NTT_PEER_MAPPING_SHAPE_INVALID";
pub const NTT_PEER_MAPPING_KEY_INVALID: &str = "NTT_PEER_MAPPING_KEY_INVALID";
pub const NTT_PEER_MAPPING_ENTRY_VALUE_INVALID: &str = "NTT_PEER_MAPPING_ENTRY_VALUE_INVALID";

/// Resolve the `peers` entries or produce the section-level FAIL.
fn peer_entries<'a>(
    document: &'a Document,
    subject: &str,
) -> Result<&'a Map<String, Value>, Box<RawCheckResult>> {
    let verdict = match peer_section(&document.root) {
        PeerSection::Entries(entries) => return Ok(entries),
        PeerSection::Missing => RawCheckResult::fail(
            NTT_PEER_MAPPING_MISSING,
            "Expected top-level peers section to exist.",
            CheckEvidence::new(
                "peers section is missing.",
                document
                    .evidence(&format!("Top-level peers section is required for {subject}."))
                    .observed(json!({
                        "config_path": document.path,
                        "peers_section_type": "missing"
                    }))
                    .expected(json!({ "section": "peers", "shape": "object" })),
            ),
            CONFIG_SOURCE,
        ),
        PeerSection::Invalid(peers) => RawCheckResult::fail(
            NTT_PEER_MAPPING_SHAPE_INVALID,
            "Expected top-level peers section to be an object (non-array).",
            CheckEvidence::new(
                "peers section has invalid shape.",
                document
                    .evidence(&format!("Top-level peers section must be object for {subject}."))
                    .observed(json!({
                        "config_path": document.path,
                        "peers_section_type": json_type_name(peers),
                        "peers_is_array": peers.is_array()
                    }))
                    .expected(json!({ "section": "peers", "shape": "object" })),
            ),
            CONFIG_SOURCE,
        ),
        PeerSection::Empty => RawCheckResult::fail(
            NTT_PEER_MAPPING_EMPTY,
            "peers section exists but contains no entries.",
            CheckEvidence::new(
                "peers section is empty.",
                document
                    .evidence(&format!("At least one peers entry is required before {subject}."))
                    .observed(json!({
                        "config_path": document.path,
                        "peer_mapping_count": 0
                    }))
                    .expected(json!({ "section": "peers", "min_entries": 1 })),
            ),
            CONFIG_SOURCE,
        ),
    };
    Err(Box::new(verdict))
}

/// Every `peers` key is a trimmed lowercase slug.
pub struct PeerMappingKeyShape;

impl PeerMappingKeyShape {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-006-ntt-peer-mapping-key-shape",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for PeerMappingKeyShape {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let document = match gate_config(
            ctx,
            ConfigGate {
                check: "Peer mapping key shape check",
                basis: "Each top-level peers key must be trimmed, non-empty, and slug-like lowercase.",
                expected: json!({ "section": "peers", "key_rules": KEY_RULES }),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };
        let entries = match peer_entries(&document, "peer key validation") {
            Ok(entries) => entries,
            Err(verdict) => return Ok(*verdict),
        };

        let basis = "Each peers key must be trimmed, non-empty, and match ^[a-z0-9][a-z0-9-_]*$";
        for key in entries.keys() {
            if let Err(reason) = validate_peer_key(key) {
                return Ok(RawCheckResult::fail(
                    NTT_PEER_MAPPING_KEY_INVALID,
                    format!("Invalid peers key '{key}': {reason}"),
                    CheckEvidence::new(
                        "Found invalid peer mapping key.",
                        document
                            .evidence(basis)
                            .observed(json!({
                                "config_path": document.path,
                                "first_invalid_key": key,
                                "first_invalid_key_trimmed": key.trim(),
                                "total_entries": entries.len()
                            }))
                            .expected(json!({ "key_rules": KEY_RULES })),
                    ),
                    CONFIG_SOURCE,
                ));
            }
        }

        let keys: Vec<&String> = entries.keys().collect();
        Ok(RawCheckResult::pass(
            "All peers keys satisfy key shape sanity invariant.",
            CheckEvidence::new(
                "Peer mapping keys are shape-valid.",
                document
                    .evidence(basis)
                    .observed(json!({
                        "config_path": document.path,
                        "peer_mapping_count": entries.len(),
                        "peer_keys": keys
                    }))
                    .expected(json!({ "key_rules": KEY_RULES })),
            ),
            CONFIG_SOURCE,
        ))
    }
}

/// Every `peers` value is a non-empty string; `0x` values are EVM addresses.
pub struct PeerMappingEntryValueShape;

impl PeerMappingEntryValueShape {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-005-ntt-peer-mapping-entry-value-shape",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for PeerMappingEntryValueShape {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let document = match gate_config(
            ctx,
            ConfigGate {
                check: "Peer mapping entry value check",
                basis: "Each top-level peers entry value must be a non-empty address string.",
                expected: json!({ "section": "peers", "value_rules": VALUE_RULES }),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };
        let entries = match peer_entries(&document, "entry value validation") {
            Ok(entries) => entries,
            Err(verdict) => return Ok(*verdict),
        };

        let basis = "Each peers value must be a non-empty string; 0x values must be 20-byte hex.";
        for (key, value) in entries {
            if let Err(reason) = validate_peer_value(value) {
                return Ok(RawCheckResult::fail(
                    NTT_PEER_MAPPING_ENTRY_VALUE_INVALID,
                    format!("Invalid peers entry value at key '{key}': {reason}"),
                    CheckEvidence::new(
                        "Found invalid peer mapping entry value.",
                        document
                            .evidence(basis)
                            .observed(json!({
                                "config_path": document.path,
                                "first_invalid_key": key,
                                "first_invalid_value_type": json_type_name(value),
                                "first_invalid_value": value,
                                "total_entries": entries.len()
                            }))
                            .expected(json!({ "value_rules": VALUE_RULES })),
                    ),
                    CONFIG_SOURCE,
                ));
            }
        }

        Ok(RawCheckResult::pass(
            "All peers entry values satisfy shape sanity invariant.",
            CheckEvidence::new(
                "Peer mapping entry values are shape-valid.",
                document
                    .evidence(basis)
                    .observed(json!({
                        "config_path": document.path,
                        "peer_mapping_count": entries.len()
                    }))
                    .expected(json!({ "value_rules": VALUE_RULES })),
            ),
            CONFIG_SOURCE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RuntimeStatus;
    use crate::test_support::{TestWorkspace, context_for};

    const EVM: &str = "0x1111111111111111111111111111111111111111";

    #[tokio::test]
    async fn key_with_trailing_space_fails() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "Eth ": EVM } }));
        let result = PeerMappingKeyShape
            .run(&context_for(&workspace))
            .await
            .expect("run");
        assert_eq!(result.status, RuntimeStatus::Fail);
        assert_eq!(
            result.details,
            "Invalid peers key 'Eth ': key must not have leading or trailing spaces"
        );
    }

    #[tokio::test]
    async fn empty_key_fails() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "": EVM } }));
        let result = PeerMappingKeyShape
            .run(&context_for(&workspace))
            .await
            .expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(NTT_PEER_MAPPING_KEY_INVALID)
        );
        assert_eq!(
            result.details,
            "Invalid peers key '': key must be non-empty after trim"
        );
    }

    #[tokio::test]
    async fn slug_keys_pass() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "eth-base": EVM, "solana": "SoLaNaPeer" } }));
        let result = PeerMappingKeyShape
            .run(&context_for(&workspace))
            .await
            .expect("run");
        assert_eq!(result.status, RuntimeStatus::Pass);
        assert_eq!(
            result.evidence.data.expect("data").observed["peer_keys"],
            json!(["eth-base", "solana"])
        );
    }

    #[tokio::test]
    async fn array_peers_is_a_shape_error() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": [EVM] }));
        let result = PeerMappingEntryValueShape
            .run(&context_for(&workspace))
            .await
            .expect("run");
        assert_eq!(
            result.reason_code.as_deref(),
            Some(NTT_PEER_MAPPING_SHAPE_INVALID)
        );
        assert_eq!(
            result.evidence.data.expect("data").observed["peers_is_array"],
            json!(true)
        );
    }

    #[tokio::test]
    async fn short_hex_value_fails() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "ethereum": EVM, "base": "0x1234" } }));
        let result = PeerMappingEntryValueShape
            .run(&context_for(&workspace))
            .await
            .expect("run");
        assert_eq!(
            result.details,
            "Invalid peers entry value at key 'base': 0x-prefixed value must match ^0x[a-fA-F0-9]{40}$"
        );
    }

    #[tokio::test]
    async fn missing_section_fails_both_checks() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "manager": {} }));
        let ctx = context_for(&workspace);
        for check in [
            &PeerMappingKeyShape as &dyn Check,
            &PeerMappingEntryValueShape as &dyn Check,
        ] {
            let result = check.run(&ctx).await.expect("run");
            assert_eq!(result.reason_code.as_deref(), Some(NTT_PEER_MAPPING_MISSING));
            assert_eq!(result.details, "Expected top-level peers section to exist.");
        }
    }
}
