//! Test-only workspaces, contexts and scripted adapters.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use crate::checks::{CheckContext, RuntimeOptions};
use crate::core::types::ProfileName;
use crate::io::adapters::AdapterRegistry;
use crate::io::config_source::ConfigFileAdapter;
use crate::io::executor_http::{
    EXECUTOR_ENDPOINT_NOT_CONFIGURED, EXECUTOR_HTTP_UNAVAILABLE, ExecutorHttp, ExecutorMode,
    ExecutorRead, ExecutorRequest, HttpReadMeta, PayloadResponse, Reachability,
};
use crate::io::settings::VerifierSettings;
use crate::io::solana_rpc::{
    HealthRead, HealthResponse, PeerAccount, PeerAccountQuery, PeerAccountRead, ReadMeta,
    SolanaRead,
};
use crate::io::source::{ReadFailure, now_timestamp, request_id};

pub const TEST_RPC_URL: &str = "http://127.0.0.1:8899";

/// Temporary directory holding `ntt.json`, a fixture and an output dir.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("ntt.json")
    }

    pub fn fixture_path(&self) -> PathBuf {
        self.root().join("fixture.json")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("artifacts")
    }

    pub fn write_config(&self, config: &Value) {
        self.write_config_raw(&serde_json::to_string_pretty(config).expect("serialize config"));
    }

    pub fn write_config_raw(&self, raw: &str) {
        fs::write(self.config_path(), raw).expect("write config");
    }

    pub fn write_fixture(&self, fixture: &Value) {
        self.write_fixture_raw(&serde_json::to_string_pretty(fixture).expect("serialize fixture"));
    }

    pub fn write_fixture_raw(&self, raw: &str) {
        fs::write(self.fixture_path(), raw).expect("write fixture");
    }

    /// Options pointing at this workspace's files.
    pub fn options(&self, profile: ProfileName) -> RuntimeOptions {
        let mut options = RuntimeOptions::new(profile, TEST_RPC_URL);
        options.config_path = path_string(&self.config_path());
        options.mock_chain_path = path_string(&self.fixture_path());
        options.output_dir = self.output_dir();
        options
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Context over `workspace` with RPC-mode registration reads and fake network adapters.
pub fn context_for(workspace: &TestWorkspace) -> CheckContext {
    ContextBuilder::new(workspace).build()
}

/// Builder for a [`CheckContext`] with real config reads and scripted network reads.
pub struct ContextBuilder {
    options: RuntimeOptions,
    settings: VerifierSettings,
    solana_read: Arc<dyn SolanaRead>,
    executor_http: Arc<dyn ExecutorHttp>,
}

impl ContextBuilder {
    pub fn new(workspace: &TestWorkspace) -> Self {
        Self {
            options: workspace.options(ProfileName::NttGeneric),
            settings: VerifierSettings::default(),
            solana_read: Arc::new(ScriptedSolanaRead::new()),
            executor_http: Arc::new(ScriptedExecutorHttp::new()),
        }
    }

    pub fn profile(mut self, profile: ProfileName) -> Self {
        self.options.profile = profile;
        self
    }

    pub fn mock_chain(mut self) -> Self {
        self.options.mock_chain = true;
        self
    }

    pub fn executor_url(mut self, endpoint: &str) -> Self {
        self.options.executor_url = Some(endpoint.to_string());
        self
    }

    pub fn settings(mut self, settings: VerifierSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solana(self, solana: Arc<impl SolanaRead + 'static>) -> Self {
        Self {
            solana_read: solana,
            ..self
        }
    }

    pub fn executor(self, executor: Arc<impl ExecutorHttp + 'static>) -> Self {
        Self {
            executor_http: executor,
            ..self
        }
    }

    pub fn build(self) -> CheckContext {
        CheckContext {
            options: self.options,
            adapters: AdapterRegistry {
                config_source: Arc::new(ConfigFileAdapter),
                solana_read: self.solana_read,
                executor_http: self.executor_http,
            },
            settings: self.settings,
        }
    }
}

/// [`SolanaRead`] answering from scripted values and recording peer queries.
///
/// Unscripted health reads answer `"ok"`; unscripted peer accounts do not exist.
#[derive(Default)]
pub struct ScriptedSolanaRead {
    health: Option<Result<HealthResponse, ReadFailure>>,
    peers: BTreeMap<u16, Result<bool, ReadFailure>>,
    queries: Mutex<Vec<PeerAccountQuery>>,
}

impl ScriptedSolanaRead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_health(mut self, health: Result<HealthResponse, ReadFailure>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_peer(mut self, chain_id: u16, exists: Result<bool, ReadFailure>) -> Self {
        self.peers.insert(chain_id, exists);
        self
    }

    pub fn peer_queries(&self) -> Vec<PeerAccountQuery> {
        self.queries.lock().expect("queries lock").clone()
    }

    fn meta(prefix: &str) -> ReadMeta {
        ReadMeta {
            endpoint: TEST_RPC_URL.to_string(),
            retrieved_at: now_timestamp(),
            request_id: request_id(prefix),
        }
    }
}

#[async_trait]
impl SolanaRead for ScriptedSolanaRead {
    async fn get_health(&self) -> HealthRead {
        HealthRead {
            meta: Self::meta("solana-health"),
            outcome: self
                .health
                .clone()
                .unwrap_or_else(|| Ok(HealthResponse::Result("ok".to_string()))),
        }
    }

    async fn get_peer_account_existence(&self, query: &PeerAccountQuery) -> PeerAccountRead {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.clone());
        let exists = self
            .peers
            .get(&query.chain_id)
            .cloned()
            .unwrap_or(Ok(false));
        PeerAccountRead {
            meta: Self::meta("solana-peer-exists"),
            query: query.clone(),
            outcome: exists.map(|exists| PeerAccount {
                pda: format!("ScriptedPeer{}", query.chain_id),
                exists,
            }),
        }
    }
}

/// [`ExecutorHttp`] answering from scripted status codes and bodies.
#[derive(Debug, Default)]
pub struct ScriptedExecutorHttp {
    reachability: Option<u16>,
    capabilities: Option<(u16, String)>,
    quote: Option<(u16, String)>,
}

impl ScriptedExecutorHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reachability(mut self, http_status: u16) -> Self {
        self.reachability = Some(http_status);
        self
    }

    pub fn with_capabilities(mut self, http_status: u16, body: &str) -> Self {
        self.capabilities = Some((http_status, body.to_string()));
        self
    }

    pub fn with_quote(mut self, http_status: u16, body: &str) -> Self {
        self.quote = Some((http_status, body.to_string()));
        self
    }

    fn respond<T>(
        request: &ExecutorRequest,
        scripted: Option<T>,
    ) -> ExecutorRead<T> {
        let request_url = request
            .endpoint
            .as_ref()
            .map(|endpoint| format!("{}{}", endpoint.trim_end_matches('/'), request.path));
        let outcome = match (&request.endpoint, scripted) {
            (None, _) => Err(ReadFailure::new(
                EXECUTOR_ENDPOINT_NOT_CONFIGURED,
                "Executor endpoint is not configured (--executor-url).",
            )),
            (Some(_), None) => Err(ReadFailure::new(
                EXECUTOR_HTTP_UNAVAILABLE,
                "Scripted executor has no response for this request.",
            )),
            (Some(_), Some(value)) => Ok(value),
        };
        ExecutorRead {
            meta: HttpReadMeta {
                mode: if request.mock_mode {
                    ExecutorMode::Mock
                } else {
                    ExecutorMode::Real
                },
                endpoint: request.endpoint.clone(),
                request_url,
                retrieved_at: now_timestamp(),
                request_id: request_id("executor-scripted"),
            },
            outcome,
        }
    }

    fn payload((http_status, body): (u16, String)) -> PayloadResponse {
        PayloadResponse {
            http_status,
            payload_json: serde_json::from_str(&body).ok(),
            payload_raw: body,
        }
    }
}

#[async_trait]
impl ExecutorHttp for ScriptedExecutorHttp {
    async fn get_endpoint_reachability(
        &self,
        request: &ExecutorRequest,
    ) -> ExecutorRead<Reachability> {
        let scripted = self.reachability.map(|http_status| Reachability {
            http_status,
            reachable: (200..300).contains(&http_status),
        });
        Self::respond(request, scripted)
    }

    async fn get_relay_capabilities(
        &self,
        request: &ExecutorRequest,
    ) -> ExecutorRead<PayloadResponse> {
        Self::respond(request, self.capabilities.clone().map(Self::payload))
    }

    async fn get_quote_payload(&self, request: &ExecutorRequest) -> ExecutorRead<PayloadResponse> {
        Self::respond(request, self.quote.clone().map(Self::payload))
    }
}
