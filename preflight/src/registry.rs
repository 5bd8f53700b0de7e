//! Profile registry: the ordered check list of each deployment profile.

use crate::checks::Check;
use crate::checks::compute_budget::ComputeBudgetSanity;
use crate::checks::config_intent::{
    ConfigSourceReadiness, ManagerProgramIdInvariant, PeerChainMappingPresence,
};
use crate::checks::decimals_sync::DecimalsSync;
use crate::checks::executor::{
    ExecutorEndpointReachability, ExecutorQuoteSanity, ExecutorRelayCapabilities,
};
use crate::checks::executor_config::ExecutorTransceiverConfigPresence;
use crate::checks::peer_mapping::{PeerMappingEntryValueShape, PeerMappingKeyShape};
use crate::checks::peer_symmetry::PeerRegistrationSymmetry;
use crate::checks::rpc_health::SolanaRpcHealth;
use crate::core::types::ProfileName;

/// Checks of `profile` in declaration order. Execution order is decided by
/// the engine.
pub fn profile_checks(profile: ProfileName) -> Vec<Box<dyn Check>> {
    let mut checks: Vec<Box<dyn Check>> = vec![
        Box::new(ConfigSourceReadiness),
        Box::new(ManagerProgramIdInvariant),
        Box::new(PeerChainMappingPresence),
        Box::new(PeerMappingKeyShape),
        Box::new(PeerMappingEntryValueShape),
    ];
    match profile {
        ProfileName::NttGeneric => checks.extend([
            Box::new(PeerRegistrationSymmetry) as Box<dyn Check>,
            Box::new(DecimalsSync),
            Box::new(SolanaRpcHealth),
        ]),
        ProfileName::SunriseExecutor => checks.extend([
            Box::new(ExecutorTransceiverConfigPresence) as Box<dyn Check>,
            Box::new(PeerRegistrationSymmetry),
            Box::new(DecimalsSync),
            Box::new(SolanaRpcHealth),
            Box::new(ExecutorEndpointReachability),
            Box::new(ExecutorRelayCapabilities),
            Box::new(ExecutorQuoteSanity),
            Box::new(ComputeBudgetSanity),
        ]),
    }
    checks
}

/// Checks for a profile given by name; unknown names select nothing.
pub fn checks_for_name(profile: &str) -> Vec<Box<dyn Check>> {
    ProfileName::parse(profile)
        .map(profile_checks)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::execution_order;

    fn ids(checks: &[Box<dyn Check>]) -> Vec<&'static str> {
        checks.iter().map(|check| check.definition().id).collect()
    }

    fn short(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id[..7].to_string()).collect()
    }

    #[test]
    fn ntt_generic_declaration_order() {
        let checks = profile_checks(ProfileName::NttGeneric);
        assert_eq!(
            short(&ids(&checks)),
            ["CHK-001", "CHK-003", "CHK-004", "CHK-006", "CHK-005", "CHK-007", "CHK-008", "CHK-002"]
        );
    }

    #[test]
    fn sunrise_executor_execution_order() {
        let checks = profile_checks(ProfileName::SunriseExecutor);
        let executed: Vec<_> = execution_order(&checks)
            .iter()
            .map(|check| check.definition().id)
            .collect();
        assert_eq!(
            short(&executed),
            [
                "CHK-001", "CHK-003", "CHK-004", "CHK-006", "CHK-005", "CHK-011", "CHK-007",
                "CHK-008", "CHK-002", "CHK-009", "CHK-010", "CHK-012", "CHK-013"
            ]
        );
        assert_eq!(executed, ids(&checks));
    }

    #[test]
    fn every_check_is_deterministic() {
        let checks = profile_checks(ProfileName::SunriseExecutor);
        assert!(checks.iter().all(|check| check.definition().deterministic));
    }

    #[test]
    fn unknown_profile_is_empty() {
        assert!(checks_for_name("solana-only").is_empty());
        assert_eq!(checks_for_name("ntt-generic").len(), 8);
        assert_eq!(checks_for_name("sunrise-executor").len(), 13);
    }

    #[test]
    fn check_ids_are_unique() {
        let mut all = ids(&profile_checks(ProfileName::SunriseExecutor));
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 13);
    }
}
