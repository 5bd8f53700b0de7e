//! Parse-or-structured-failure helpers shared by the checks.
//!
//! Every document is either fully parsed or turned into exactly one result:
//! an unreadable source is SKIPPED (degraded), a malformed one is FAIL.

use serde_json::{Value, json};

use crate::checks::context::CheckContext;
use crate::core::chain::{ChainPair, expected_pairs, normalize_chain, title_chain};
use crate::core::peers::{PeerSection, peer_section};
use crate::core::registration::{DirectionalRegistration, parse_fixture};
use crate::core::result::{CheckEvidence, EvidenceData, RawCheckResult, RetrievalMarker};
use crate::io::config_source::{CONFIG_SOURCE_KIND, ConfigParseError, ConfigSource};
use crate::io::source::ReadFailure;

/// `source` of results derived from the intent config.
pub const CONFIG_SOURCE: &str = "adapter/config-file";
/// `source` of results derived from the mock-chain fixture.
pub const FIXTURE_SOURCE: &str = "mock-chain-fixture";

pub const NTT_PEER_MAPPING_MISSING: &str = "NTT_PEER_MAPPING_MISSING";
pub const MOCK_CHAIN_PARSE_ERROR: &str = "MOCK_CHAIN_PARSE_ERROR";
pub const MOCK_CHAIN_FIXTURE_SHAPE_INVALID: &str = "MOCK_CHAIN_FIXTURE_SHAPE_INVALID";

/// A successfully read and parsed JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: String,
    pub retrieved_at: String,
    pub raw_bytes: usize,
    pub root: Value,
}

impl Document {
    pub fn marker(&self) -> RetrievalMarker {
        RetrievalMarker::at(&self.retrieved_at)
    }

    /// Evidence attributed to the config-file source kind.
    pub fn evidence(&self, basis: &str) -> EvidenceData {
        EvidenceData::new(CONFIG_SOURCE_KIND, basis, self.marker())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentLoad {
    Ready(Document),
    Unavailable {
        path: String,
        retrieved_at: String,
        failure: ReadFailure,
    },
    Malformed {
        path: String,
        retrieved_at: String,
        raw_bytes: usize,
        error: ConfigParseError,
    },
}

pub async fn read_document(source: &dyn ConfigSource, path: &str) -> DocumentLoad {
    let read = source.read_config(path).await;
    let raw = match read.outcome {
        Ok(raw) => raw,
        Err(failure) => {
            return DocumentLoad::Unavailable {
                path: read.path,
                retrieved_at: read.retrieved_at,
                failure,
            };
        }
    };
    match source.parse_config(&raw) {
        Ok(root) => DocumentLoad::Ready(Document {
            path: read.path,
            retrieved_at: read.retrieved_at,
            raw_bytes: raw.len(),
            root,
        }),
        Err(error) => DocumentLoad::Malformed {
            path: read.path,
            retrieved_at: read.retrieved_at,
            raw_bytes: raw.len(),
            error,
        },
    }
}

/// Wording for the two failure results of the config gate.
pub struct ConfigGate<'a> {
    /// Capitalized subject, e.g. `Peer mapping key shape check`.
    pub check: &'a str,
    pub basis: &'a str,
    pub expected: Value,
}

/// Load the intent config or produce the check's SKIPPED/FAIL result.
pub async fn gate_config(
    ctx: &CheckContext,
    gate: ConfigGate<'_>,
) -> Result<Document, Box<RawCheckResult>> {
    let load = read_document(ctx.adapters.config_source.as_ref(), &ctx.options.config_path).await;
    match load {
        DocumentLoad::Ready(document) => Ok(document),
        DocumentLoad::Unavailable {
            path,
            retrieved_at,
            failure,
        } => Err(Box::new(RawCheckResult::skipped(
            failure.reason_code,
            format!(
                "{} skipped because config source is unavailable: {}",
                gate.check, failure.details
            ),
            CheckEvidence::new(
                "Config intent source could not be read.",
                EvidenceData::new(CONFIG_SOURCE_KIND, gate.basis, RetrievalMarker::at(retrieved_at))
                    .observed(json!({ "config_path": path }))
                    .expected(gate.expected),
            ),
            CONFIG_SOURCE,
        ))),
        DocumentLoad::Malformed {
            path,
            retrieved_at,
            raw_bytes,
            error,
        } => Err(Box::new(RawCheckResult::fail(
            error.reason_code(),
            format!(
                "{} failed because JSON parse failed: {}",
                gate.check, error.details
            ),
            CheckEvidence::new(
                "Config parse failed before evaluation.",
                EvidenceData::new(CONFIG_SOURCE_KIND, gate.basis, RetrievalMarker::at(retrieved_at))
                    .observed(json!({ "config_path": path, "raw_bytes": raw_bytes }))
                    .expected(gate.expected),
            ),
            CONFIG_SOURCE,
        ))),
    }
}

/// Load the mock-chain fixture and its directional registrations.
pub async fn gate_fixture(
    ctx: &CheckContext,
) -> Result<(Document, Vec<DirectionalRegistration>), Box<RawCheckResult>> {
    let basis = "Mock fixture must provide directional registrations {from,to,registered,decimals?}.";
    let load =
        read_document(ctx.adapters.config_source.as_ref(), &ctx.options.mock_chain_path).await;
    let document = match load {
        DocumentLoad::Ready(document) => document,
        DocumentLoad::Unavailable {
            path,
            retrieved_at,
            failure,
        } => {
            return Err(Box::new(RawCheckResult::skipped(
                failure.reason_code,
                format!("Mock-chain fixture unavailable: {}", failure.details),
                CheckEvidence::new(
                    "Mock fixture could not be read.",
                    EvidenceData::new(CONFIG_SOURCE_KIND, basis, RetrievalMarker::at(retrieved_at))
                        .observed(json!({ "mock_chain_path": path }))
                        .expected(json!({ "mock_fixture_readable": true })),
                ),
                FIXTURE_SOURCE,
            )));
        }
        DocumentLoad::Malformed {
            path,
            retrieved_at,
            error,
            ..
        } => {
            return Err(Box::new(RawCheckResult::fail(
                MOCK_CHAIN_PARSE_ERROR,
                format!("Mock fixture parse failed: {}", error.details),
                CheckEvidence::new(
                    "Mock fixture JSON parse failed before registration lookup.",
                    EvidenceData::new(CONFIG_SOURCE_KIND, basis, RetrievalMarker::at(retrieved_at))
                        .observed(json!({ "mock_chain_path": path }))
                        .expected(json!({ "parseable_json": true })),
                ),
                FIXTURE_SOURCE,
            )));
        }
    };

    match parse_fixture(&document.root) {
        Ok(records) => Ok((document, records)),
        Err(details) => Err(Box::new(RawCheckResult::fail(
            MOCK_CHAIN_FIXTURE_SHAPE_INVALID,
            details,
            CheckEvidence::new(
                "Mock fixture shape is invalid.",
                document
                    .evidence(basis)
                    .observed(json!({ "mock_chain_path": document.path }))
                    .expected(json!({
                        "fixture_shape": "registrations[] objects with string from/to and boolean registered"
                    })),
            ),
            FIXTURE_SOURCE,
        ))),
    }
}

/// Expected `local<->peer` pairs from the config `peers` keys, normalized.
///
/// `check` names the correlation in the failure detail.
pub fn expected_peer_pairs(
    ctx: &CheckContext,
    document: &Document,
    check: &str,
) -> Result<Vec<ChainPair>, Box<RawCheckResult>> {
    let peers = match peer_section(&document.root) {
        PeerSection::Entries(map) => map,
        section => {
            let present = !matches!(section, PeerSection::Missing);
            return Err(Box::new(RawCheckResult::fail(
                NTT_PEER_MAPPING_MISSING,
                format!("Cannot run {check} check: config peers mapping is missing or empty."),
                CheckEvidence::new(
                    format!("{} needs a non-empty top-level peers mapping.", title_chain(check)),
                    document
                        .evidence("Expected checked pairs are localChain<->peer for every config peers key.")
                        .observed(json!({
                            "config_path": document.path,
                            "peers_present": present,
                            "peers_count": 0
                        }))
                        .expected(json!({ "peers_count_min": 1 })),
                ),
                CONFIG_SOURCE,
            )));
        }
    };
    let peer_keys: Vec<String> = peers.keys().map(|key| normalize_chain(key)).collect();
    Ok(expected_pairs(&ctx.settings.local_chain, &peer_keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RuntimeStatus;
    use crate::test_support::{TestWorkspace, context_for};

    #[tokio::test]
    async fn unreadable_config_is_skipped_with_reason() {
        let workspace = TestWorkspace::new();
        let ctx = context_for(&workspace);
        let verdict = gate_config(
            &ctx,
            ConfigGate {
                check: "Example check",
                basis: "basis",
                expected: json!({ "config_readable": true }),
            },
        )
        .await
        .expect_err("missing config");
        assert_eq!(verdict.status, RuntimeStatus::Skipped);
        assert_eq!(verdict.reason_code.as_deref(), Some("CONFIG_NOT_FOUND"));
        assert!(
            verdict
                .details
                .starts_with("Example check skipped because config source is unavailable:")
        );
        assert!(verdict.degradation);
    }

    #[tokio::test]
    async fn malformed_config_fails_with_parse_error() {
        let workspace = TestWorkspace::new();
        workspace.write_config_raw("{not json");
        let ctx = context_for(&workspace);
        let verdict = gate_config(
            &ctx,
            ConfigGate {
                check: "Example check",
                basis: "basis",
                expected: json!({}),
            },
        )
        .await
        .expect_err("malformed");
        assert_eq!(verdict.status, RuntimeStatus::Fail);
        assert_eq!(verdict.reason_code.as_deref(), Some("CONFIG_PARSE_ERROR"));
        assert!(!verdict.degradation);
    }

    #[tokio::test]
    async fn fixture_shape_errors_fail() {
        let workspace = TestWorkspace::new();
        workspace.write_fixture(&json!({ "registrations": [1] }));
        let ctx = context_for(&workspace);
        let verdict = gate_fixture(&ctx).await.expect_err("shape");
        assert_eq!(
            verdict.reason_code.as_deref(),
            Some(MOCK_CHAIN_FIXTURE_SHAPE_INVALID)
        );
        assert_eq!(verdict.details, "registrations[0] must be an object.");
        assert_eq!(verdict.source, FIXTURE_SOURCE);
    }

    #[tokio::test]
    async fn peer_pairs_are_normalized_in_declaration_order() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": { "Base ": "x", "ethereum": "y" } }));
        let ctx = context_for(&workspace);
        let DocumentLoad::Ready(document) =
            read_document(ctx.adapters.config_source.as_ref(), &ctx.options.config_path).await
        else {
            panic!("config should load");
        };
        let pairs = expected_peer_pairs(&ctx, &document, "symmetry").expect("pairs");
        let labels: Vec<String> = pairs.iter().map(ChainPair::label).collect();
        assert_eq!(labels, vec!["solana<->base", "solana<->ethereum"]);
    }

    #[tokio::test]
    async fn empty_peers_cannot_form_pairs() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "peers": {} }));
        let ctx = context_for(&workspace);
        let DocumentLoad::Ready(document) =
            read_document(ctx.adapters.config_source.as_ref(), &ctx.options.config_path).await
        else {
            panic!("config should load");
        };
        let verdict = expected_peer_pairs(&ctx, &document, "symmetry").expect_err("empty");
        assert_eq!(verdict.reason_code.as_deref(), Some(NTT_PEER_MAPPING_MISSING));
        assert_eq!(
            verdict.details,
            "Cannot run symmetry check: config peers mapping is missing or empty."
        );
    }
}
