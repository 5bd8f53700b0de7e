//! Deterministic checks on the intent config document itself.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::checks::support::{
    CONFIG_SOURCE, ConfigGate, DocumentLoad, NTT_PEER_MAPPING_MISSING, gate_config, read_document,
};
use crate::checks::{Check, CheckContext};
use crate::core::peers::{PROGRAM_ID_PATTERN, PeerSection, is_program_id, json_type_name, peer_section};
use crate::core::result::{
    CheckDefinition, CheckEvidence, EvidenceData, RawCheckResult, RetrievalMarker,
};
use crate::core::types::SeverityClass;
use crate::io::config_source::CONFIG_SOURCE_KIND;

pub const NTT_MANAGER_PROGRAM_ID_INVALID: &str = "NTT_MANAGER_PROGRAM_ID_INVALID";
pub const NTT_PEER_MAPPING_EMPTY: &str = "NTT_PEER_MAPPING_EMPTY";

/// Config file is present, readable and parseable JSON.
pub struct ConfigSourceReadiness;

impl ConfigSourceReadiness {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-001-config-intent-source-readiness",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for ConfigSourceReadiness {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let load =
            read_document(ctx.adapters.config_source.as_ref(), &ctx.options.config_path).await;
        let result = match load {
            DocumentLoad::Unavailable {
                path,
                retrieved_at,
                failure,
            } => RawCheckResult::skipped(
                failure.reason_code,
                format!("Config source unavailable: {}", failure.details),
                CheckEvidence::new(
                    "Config intent source could not be read.",
                    EvidenceData::new(
                        CONFIG_SOURCE_KIND,
                        "Config file must be present and readable.",
                        RetrievalMarker::at(retrieved_at),
                    )
                    .observed(json!({ "config_path": path })),
                ),
                CONFIG_SOURCE,
            ),
            DocumentLoad::Malformed {
                path,
                retrieved_at,
                raw_bytes,
                error,
            } => RawCheckResult::fail(
                error.reason_code(),
                format!("Config parse failed: {}", error.details),
                CheckEvidence::new(
                    "Config intent source is readable but not parseable JSON.",
                    EvidenceData::new(
                        CONFIG_SOURCE_KIND,
                        "Config file must be parseable JSON.",
                        RetrievalMarker::at(retrieved_at),
                    )
                    .observed(json!({ "config_path": path, "raw_bytes": raw_bytes })),
                ),
                CONFIG_SOURCE,
            ),
            DocumentLoad::Ready(document) => {
                let top_level_keys = document.root.as_object().map_or(0, |root| root.len());
                RawCheckResult::pass(
                    "Config source is present, readable, and parseable JSON.",
                    CheckEvidence::new(
                        "Config intent source readiness confirmed.",
                        document
                            .evidence("Config file is required as deterministic intent source.")
                            .observed(json!({
                                "config_path": document.path,
                                "raw_bytes": document.raw_bytes,
                                "top_level_keys_count": top_level_keys
                            })),
                    ),
                    CONFIG_SOURCE,
                )
            }
        };
        Ok(result)
    }
}

/// `manager.solanaProgramId` is a base58 Solana program id.
pub struct ManagerProgramIdInvariant;

impl ManagerProgramIdInvariant {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-003-ntt-intent-manager-program-id-invariant",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

fn program_id_expectation() -> Value {
    json!({
        "manager_path": "manager.solanaProgramId",
        "format": "base58 string length 32..44",
        "pattern": PROGRAM_ID_PATTERN
    })
}

#[async_trait]
impl Check for ManagerProgramIdInvariant {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let basis =
            "ntt.json.manager.solanaProgramId must exist and be a base58-like Solana program id.";
        let document = match gate_config(
            ctx,
            ConfigGate {
                check: "Domain check",
                basis,
                expected: program_id_expectation(),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };

        let manager = document
            .root
            .as_object()
            .and_then(|root| root.get("manager"))
            .and_then(Value::as_object);
        let program_id = manager.and_then(|manager| manager.get("solanaProgramId"));

        match program_id.and_then(Value::as_str) {
            Some(program_id) if is_program_id(program_id) => Ok(RawCheckResult::pass(
                "Domain invariant passed: manager.solanaProgramId is present and valid.",
                CheckEvidence::new(
                    "Config includes a valid manager.solanaProgramId intent field.",
                    document
                        .evidence(
                            "manager.solanaProgramId is required as a domain-level NTT intent anchor.",
                        )
                        .observed(json!({
                            "config_path": document.path,
                            "manager_section_present": true,
                            "solana_program_id": program_id
                        }))
                        .expected(program_id_expectation()),
                ),
                CONFIG_SOURCE,
            )),
            _ => Ok(RawCheckResult::fail(
                NTT_MANAGER_PROGRAM_ID_INVALID,
                "Expected ntt.json.manager.solanaProgramId to be a base58 string with length 32..44.",
                CheckEvidence::new(
                    "Domain invariant failed for manager.solanaProgramId.",
                    document
                        .evidence(
                            "manager.solanaProgramId must be present to identify the NTT manager program on Solana.",
                        )
                        .observed(json!({
                            "config_path": document.path,
                            "manager_section_present": manager.is_some(),
                            "solana_program_id_type": program_id.map_or("undefined", json_type_name),
                            "solana_program_id_value": program_id.and_then(Value::as_str)
                        }))
                        .expected(program_id_expectation()),
                ),
                CONFIG_SOURCE,
            )),
        }
    }
}

/// At least one peer chain is declared.
pub struct PeerChainMappingPresence;

impl PeerChainMappingPresence {
    pub const DEFINITION: CheckDefinition = CheckDefinition {
        id: "CHK-004-ntt-peer-chain-mapping-presence",
        severity_class: SeverityClass::Blocking,
        deterministic: true,
    };
}

#[async_trait]
impl Check for PeerChainMappingPresence {
    fn definition(&self) -> &CheckDefinition {
        &Self::DEFINITION
    }

    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<RawCheckResult> {
        let expected = json!({ "section": "peers", "min_entries": 1 });
        let document = match gate_config(
            ctx,
            ConfigGate {
                check: "Peer/chain mapping check",
                basis: "ntt.json must contain a non-empty peers mapping.",
                expected: expected.clone(),
            },
        )
        .await
        {
            Ok(document) => document,
            Err(verdict) => return Ok(*verdict),
        };

        let basis = "At least one peer/chain mapping must be declared in intent.";
        let result = match peer_section(&document.root) {
            PeerSection::Missing | PeerSection::Invalid(_) => RawCheckResult::fail(
                NTT_PEER_MAPPING_MISSING,
                "Expected ntt.json to include a peers section with at least one entry.",
                CheckEvidence::new(
                    "Peer/chain mapping section is missing.",
                    document
                        .evidence(basis)
                        .observed(json!({
                            "config_path": document.path,
                            "peers_section_present": false
                        }))
                        .expected(expected),
                ),
                CONFIG_SOURCE,
            ),
            PeerSection::Empty => RawCheckResult::fail(
                NTT_PEER_MAPPING_EMPTY,
                "peers section exists but contains no entries.",
                CheckEvidence::new(
                    "Peer/chain mapping section is empty.",
                    document
                        .evidence(basis)
                        .observed(json!({
                            "config_path": document.path,
                            "peers_section_present": true,
                            "peer_mapping_count": 0
                        }))
                        .expected(expected),
                ),
                CONFIG_SOURCE,
            ),
            PeerSection::Entries(peers) => {
                let keys: Vec<&String> = peers.keys().collect();
                RawCheckResult::pass(
                    "Peer/chain mapping invariant passed: peers section contains entries.",
                    CheckEvidence::new(
                        "Intent includes non-empty peer/chain mapping.",
                        document
                            .evidence(basis)
                            .observed(json!({
                                "config_path": document.path,
                                "peers_section_present": true,
                                "peer_mapping_count": keys.len(),
                                "peer_mapping_keys": keys
                            }))
                            .expected(expected),
                    ),
                    CONFIG_SOURCE,
                )
            }
        };
        Ok(result)
    }
}
