//! Verifier settings: the constant tables injected into every check.
//!
//! Stored as TOML and passed with `--settings`. Without the flag the
//! documented mainnet values apply; missing fields in a given file fall back
//! to them too.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::core::chain::normalize_chain;
use crate::core::compute_budget::ComputeBudgetPolicy;

/// Verifier settings (TOML).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifierSettings {
    /// Chain key of the chain the manager program lives on.
    pub local_chain: String,

    /// Wormhole chain id of `local_chain`; seeds the reverse peer lookup.
    pub local_chain_id: u16,

    /// Per-call network timeout in milliseconds (RPC and executor HTTP).
    pub network_timeout_ms: u64,

    /// Chain key -> Wormhole chain id.
    pub chain_ids: BTreeMap<String, u16>,

    pub compute_budget: ComputeBudgetPolicy,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        let chain_ids = [
            ("solana", 1),
            ("ethereum", 2),
            ("bsc", 4),
            ("polygon", 5),
            ("avalanche", 6),
            ("arbitrum", 23),
            ("optimism", 24),
            ("base", 30),
        ]
        .into_iter()
        .map(|(key, id)| (key.to_string(), id))
        .collect();

        Self {
            local_chain: "solana".to_string(),
            local_chain_id: 1,
            network_timeout_ms: 5_000,
            chain_ids,
            compute_budget: ComputeBudgetPolicy::default(),
        }
    }
}

impl VerifierSettings {
    pub fn validate(&self) -> Result<()> {
        if self.network_timeout_ms == 0 {
            return Err(anyhow!("network_timeout_ms must be > 0"));
        }
        if self.local_chain.trim().is_empty() {
            return Err(anyhow!("local_chain must be non-empty"));
        }
        if self.compute_budget.buffer_denominator == 0 {
            return Err(anyhow!("compute_budget.buffer_denominator must be > 0"));
        }
        match self.chain_ids.get(&self.local_chain) {
            Some(id) if *id == self.local_chain_id => Ok(()),
            Some(id) => Err(anyhow!(
                "chain_ids.{} = {id} disagrees with local_chain_id = {}",
                self.local_chain,
                self.local_chain_id
            )),
            None => Err(anyhow!(
                "chain_ids must contain local_chain '{}'",
                self.local_chain
            )),
        }
    }

    /// Lower-case `local_chain` and the `chain_ids` keys so lookups by
    /// normalized peer keys match. Keys that collide after normalization are
    /// rejected.
    pub fn normalize_chain_keys(mut self) -> Result<Self> {
        self.local_chain = normalize_chain(&self.local_chain);
        let mut chain_ids = BTreeMap::new();
        for (key, id) in std::mem::take(&mut self.chain_ids) {
            let key = normalize_chain(&key);
            if chain_ids.insert(key.clone(), id).is_some() {
                bail!("chain_ids lists '{key}' more than once after lower-casing");
            }
        }
        self.chain_ids = chain_ids;
        Ok(self)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }

    /// Wormhole chain id for a normalized chain key, if mapped.
    pub fn chain_id(&self, chain_key: &str) -> Option<u16> {
        self.chain_ids.get(chain_key).copied()
    }
}

/// Load settings from a TOML file. The file must exist.
pub fn load_settings(path: &Path) -> Result<VerifierSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    let settings = toml::from_str::<VerifierSettings>(&contents)
        .with_context(|| format!("parse {}", path.display()))?
        .normalize_chain_keys()
        .with_context(|| format!("normalize {}", path.display()))?;
    settings
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_known_chains() {
        let settings = VerifierSettings::default();
        settings.validate().expect("valid");
        assert_eq!(settings.chain_id("base"), Some(30));
        assert_eq!(settings.chain_id("eth"), None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("custom-settings.toml");
        let err = load_settings(&path).expect_err("missing settings");
        assert!(
            format!("{err:#}").starts_with("read settings file "),
            "{err:#}"
        );
    }

    #[test]
    fn chain_keys_are_lower_cased() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("settings.toml");
        fs::write(
            &path,
            "local_chain = \"Solana\"\n\n[chain_ids]\nSolana = 1\nEthereum = 2\n",
        )
        .expect("write");

        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.local_chain, "solana");
        assert_eq!(settings.chain_id("ethereum"), Some(2));
        assert_eq!(settings.chain_id("Ethereum"), None);
    }

    #[test]
    fn chain_keys_colliding_after_lower_casing_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("settings.toml");
        fs::write(&path, "[chain_ids]\nsolana = 1\nbase = 30\nBase = 31\n").expect("write");

        let err = load_settings(&path).expect_err("collision");
        assert!(format!("{err:#}").contains("'base' more than once"), "{err:#}");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("settings.toml");
        fs::write(
            &path,
            "network_timeout_ms = 250\n\n[compute_budget]\nbase_minimum = 200000\n",
        )
        .expect("write");

        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.network_timeout(), Duration::from_millis(250));
        assert_eq!(settings.compute_budget.base_minimum, 200_000);
        assert_eq!(settings.compute_budget.buffer_numerator, 12);
        assert_eq!(settings.local_chain, "solana");
    }

    #[test]
    fn chain_table_replaces_defaults_and_must_contain_local_chain() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("settings.toml");
        fs::write(&path, "[chain_ids]\nethereum = 2\n").expect("write");

        let err = load_settings(&path).expect_err("local chain missing");
        assert!(
            format!("{err:#}").contains("chain_ids must contain local_chain 'solana'"),
            "{err:#}"
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let settings = VerifierSettings {
            network_timeout_ms: 0,
            ..VerifierSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
