//! Where directional registration state comes from.
//!
//! The correlation checks are written against [`RegistrationSource`]; the
//! runtime options pick the fixture or the live Solana implementation.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::checks::context::RuntimeOptions;
use crate::checks::support::{CONFIG_SOURCE, Document, FIXTURE_SOURCE, gate_fixture};
use crate::checks::CheckContext;
use crate::core::chain::ChainPair;
use crate::core::registration::{DirectionalRegistration, RegistrationSnapshot};
use crate::core::result::{CheckEvidence, EvidenceData, RawCheckResult, RetrievalMarker};
use crate::io::solana_rpc::{PeerAccountQuery, RPC_SOURCE};
use crate::io::source::now_timestamp;

pub const NTT_MANAGER_PROGRAM_ID_MISSING: &str = "NTT_MANAGER_PROGRAM_ID_MISSING";
pub const NTT_CHAIN_ID_MAPPING_UNSUPPORTED: &str = "NTT_CHAIN_ID_MAPPING_UNSUPPORTED";

/// Registration state for every expected pair, with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationLoad {
    pub snapshot: RegistrationSnapshot,
    /// `source` of results judged from this snapshot.
    pub source: &'static str,
    pub retrieval_marker: RetrievalMarker,
}

#[async_trait]
pub trait RegistrationSource: Send + Sync {
    /// Short mode name reported in evidence, e.g. `mock-chain`.
    fn mode(&self) -> &'static str;

    /// Whether records carry decimals metadata.
    fn provides_decimals(&self) -> bool;

    /// Load registrations for `pairs`, or the result that ends the check.
    async fn load(
        &self,
        ctx: &CheckContext,
        config: &Document,
        pairs: &[ChainPair],
    ) -> Result<RegistrationLoad, Box<RawCheckResult>>;
}

pub fn registration_source_for(options: &RuntimeOptions) -> Box<dyn RegistrationSource> {
    if options.mock_chain {
        Box::new(FixtureRegistrationSource)
    } else {
        Box::new(RpcRegistrationSource)
    }
}

/// Registrations from the mock-chain fixture document.
pub struct FixtureRegistrationSource;

#[async_trait]
impl RegistrationSource for FixtureRegistrationSource {
    fn mode(&self) -> &'static str {
        "mock-chain"
    }

    fn provides_decimals(&self) -> bool {
        true
    }

    async fn load(
        &self,
        ctx: &CheckContext,
        _config: &Document,
        _pairs: &[ChainPair],
    ) -> Result<RegistrationLoad, Box<RawCheckResult>> {
        let (document, records) = gate_fixture(ctx).await?;
        debug!(records = records.len(), path = %document.path, "loaded fixture registrations");
        Ok(RegistrationLoad {
            snapshot: records.into_iter().collect(),
            source: FIXTURE_SOURCE,
            retrieval_marker: document.marker(),
        })
    }
}

/// Existence-only registrations read from peer accounts on Solana.
///
/// The forward record of `solana<->peer` is the peer account seeded with the
/// peer chain id; the reverse record is seeded with the local chain id.
pub struct RpcRegistrationSource;

impl RpcRegistrationSource {
    fn read_failed(
        pair: &ChainPair,
        direction: String,
        chain_id: u16,
        marker: RetrievalMarker,
        failure_code: &'static str,
        failure_details: &str,
    ) -> Box<RawCheckResult> {
        Box::new(RawCheckResult::skipped(
            failure_code,
            format!("Peer registration read failed for {direction}: {failure_details}"),
            CheckEvidence::new(
                "RPC source unavailable while reading peer registration existence.",
                EvidenceData::new(
                    RPC_SOURCE,
                    "Peer account existence is read per direction from Solana RPC.",
                    marker,
                )
                .observed(json!({
                    "checked_pair": pair.label(),
                    "direction": direction,
                    "chain_id": chain_id
                }))
                .expected(json!({ "rpc_readable": true })),
            ),
            RPC_SOURCE,
        ))
    }
}

#[async_trait]
impl RegistrationSource for RpcRegistrationSource {
    fn mode(&self) -> &'static str {
        "rpc"
    }

    fn provides_decimals(&self) -> bool {
        false
    }

    #[instrument(skip_all, fields(pairs = pairs.len()))]
    async fn load(
        &self,
        ctx: &CheckContext,
        config: &Document,
        pairs: &[ChainPair],
    ) -> Result<RegistrationLoad, Box<RawCheckResult>> {
        let program_id = config
            .root
            .get("manager")
            .and_then(|manager| manager.get("solanaProgramId"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if program_id.is_empty() {
            return Err(Box::new(RawCheckResult::fail(
                NTT_MANAGER_PROGRAM_ID_MISSING,
                "Cannot read registrations over RPC: manager.solanaProgramId is missing in config.",
                CheckEvidence::new(
                    "RPC registration reads require manager.solanaProgramId.",
                    config
                        .evidence("Peer accounts are derived from the manager program id and a chain id.")
                        .observed(json!({
                            "config_path": config.path,
                            "manager_solana_program_id_present": false
                        }))
                        .expected(json!({ "manager_solana_program_id_present": true })),
                ),
                CONFIG_SOURCE,
            )));
        }

        let local_chain_id = ctx.settings.local_chain_id;
        let solana = ctx.adapters.solana_read.as_ref();
        let mut snapshot = RegistrationSnapshot::default();
        let mut marker = RetrievalMarker::at(now_timestamp());

        for pair in pairs {
            let Some(peer_chain_id) = ctx.settings.chain_id(&pair.peer) else {
                return Err(Box::new(RawCheckResult::fail(
                    NTT_CHAIN_ID_MAPPING_UNSUPPORTED,
                    format!(
                        "Unsupported peer chain key '{}' for RPC chain-id mapping.",
                        pair.peer
                    ),
                    CheckEvidence::new(
                        "Could not derive a chain identifier for peer key.",
                        config
                            .evidence("RPC mode maps known peers keys to Wormhole chain ids.")
                            .observed(json!({ "peer_key": pair.peer }))
                            .expected(json!({ "chain_id_mapping_available": true })),
                    ),
                    CONFIG_SOURCE,
                )));
            };

            let directions = [
                (pair.forward_key(), pair.local.as_str(), pair.peer.as_str(), peer_chain_id),
                (pair.reverse_key(), pair.peer.as_str(), pair.local.as_str(), local_chain_id),
            ];
            for (direction, from, to, chain_id) in directions {
                let read = solana
                    .get_peer_account_existence(&PeerAccountQuery {
                        manager_program_id: program_id.to_string(),
                        chain_id,
                    })
                    .await;
                marker = RetrievalMarker::request(read.meta.retrieved_at, read.meta.request_id);
                match read.outcome {
                    Ok(account) => {
                        debug!(%direction, pda = %account.pda, exists = account.exists, "peer account read");
                        snapshot.insert(DirectionalRegistration::existence(from, to, account.exists));
                    }
                    Err(failure) => {
                        return Err(Self::read_failed(
                            pair,
                            direction,
                            chain_id,
                            marker,
                            failure.reason_code,
                            &failure.details,
                        ));
                    }
                }
            }
        }

        Ok(RegistrationLoad {
            snapshot,
            source: RPC_SOURCE,
            retrieval_marker: marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::checks::support::{DocumentLoad, read_document};
    use crate::core::types::RuntimeStatus;
    use crate::io::source::ReadFailure;
    use crate::test_support::{ContextBuilder, ScriptedSolanaRead, TestWorkspace};

    const PROGRAM_ID: &str = "NTTManager111111111111111111111111111111111";

    async fn config_document(ctx: &CheckContext) -> Document {
        match read_document(ctx.adapters.config_source.as_ref(), &ctx.options.config_path).await {
            DocumentLoad::Ready(document) => document,
            other => panic!("config should load: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rpc_reads_forward_with_peer_id_and_reverse_with_local_id() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({
            "manager": { "solanaProgramId": PROGRAM_ID },
            "peers": { "ethereum": "0x1111111111111111111111111111111111111111" }
        }));
        let solana = Arc::new(
            ScriptedSolanaRead::new()
                .with_peer(2, Ok(true))
                .with_peer(1, Ok(false)),
        );
        let ctx = ContextBuilder::new(&workspace).solana(solana.clone()).build();
        let config = config_document(&ctx).await;
        let pairs = vec![ChainPair::new("solana", "ethereum")];

        let load = RpcRegistrationSource
            .load(&ctx, &config, &pairs)
            .await
            .expect("load");
        assert!(load.snapshot.is_registered("solana->ethereum"));
        assert!(!load.snapshot.is_registered("ethereum->solana"));
        assert_eq!(load.source, RPC_SOURCE);

        let chain_ids: Vec<u16> = solana.peer_queries().iter().map(|q| q.chain_id).collect();
        assert_eq!(chain_ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn rpc_rejects_unknown_chain_keys() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "manager": { "solanaProgramId": PROGRAM_ID } }));
        let ctx = ContextBuilder::new(&workspace).build();
        let config = config_document(&ctx).await;

        let verdict = RpcRegistrationSource
            .load(&ctx, &config, &[ChainPair::new("solana", "sui")])
            .await
            .expect_err("unsupported");
        assert_eq!(
            verdict.reason_code.as_deref(),
            Some(NTT_CHAIN_ID_MAPPING_UNSUPPORTED)
        );
    }

    #[tokio::test]
    async fn rpc_requires_manager_program_id() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "manager": { "solanaProgramId": "  " } }));
        let ctx = ContextBuilder::new(&workspace).build();
        let config = config_document(&ctx).await;

        let verdict = RpcRegistrationSource
            .load(&ctx, &config, &[ChainPair::new("solana", "ethereum")])
            .await
            .expect_err("missing program id");
        assert_eq!(verdict.status, RuntimeStatus::Fail);
        assert_eq!(
            verdict.reason_code.as_deref(),
            Some(NTT_MANAGER_PROGRAM_ID_MISSING)
        );
    }

    #[tokio::test]
    async fn rpc_timeout_is_skipped() {
        let workspace = TestWorkspace::new();
        workspace.write_config(&json!({ "manager": { "solanaProgramId": PROGRAM_ID } }));
        let solana = Arc::new(
            ScriptedSolanaRead::new()
                .with_peer(2, Err(ReadFailure::new("RPC_TIMEOUT", "RPC timeout after 5000ms."))),
        );
        let ctx = ContextBuilder::new(&workspace).solana(solana).build();
        let config = config_document(&ctx).await;

        let verdict = RpcRegistrationSource
            .load(&ctx, &config, &[ChainPair::new("solana", "ethereum")])
            .await
            .expect_err("timeout");
        assert_eq!(verdict.status, RuntimeStatus::Skipped);
        assert_eq!(verdict.reason_code.as_deref(), Some("RPC_TIMEOUT"));
        assert_eq!(
            verdict.details,
            "Peer registration read failed for solana->ethereum: RPC timeout after 5000ms."
        );
        assert!(verdict.degradation);
    }

    #[test]
    fn options_select_the_source() {
        let workspace = TestWorkspace::new();
        let ctx = ContextBuilder::new(&workspace).mock_chain().build();
        assert_eq!(registration_source_for(&ctx.options).mode(), "mock-chain");
        assert!(registration_source_for(&ctx.options).provides_decimals());

        let ctx = ContextBuilder::new(&workspace).build();
        assert_eq!(registration_source_for(&ctx.options).mode(), "rpc");
    }
}
