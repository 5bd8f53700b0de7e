//! Check lifecycle: order, execute, normalize and validate.

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::checks::{Check, CheckContext};
use crate::core::contract::{ContractViolation, assert_runtime_contract};
use crate::core::result::CheckResult;

/// Fatal conditions that abort a verification run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    ContractViolation(#[from] ContractViolation),
    #[error("check {check_id} failed unexpectedly")]
    CheckFault {
        check_id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Execution order: deterministic checks first, declaration order kept
/// within each group.
pub fn execution_order(checks: &[Box<dyn Check>]) -> Vec<&dyn Check> {
    let mut ordered: Vec<&dyn Check> = checks.iter().map(|check| &**check).collect();
    ordered.sort_by_key(|check| !check.definition().deterministic);
    ordered
}

/// Run every check once, strictly one after another.
///
/// Each raw result is normalized with the check's identity and the run's
/// profile, then validated before it is appended. The first fault or
/// contract violation stops the run and discards partial results.
#[instrument(skip_all, fields(profile = %ctx.options.profile, checks = checks.len()))]
pub async fn run_check_lifecycle(
    ctx: &CheckContext,
    checks: &[Box<dyn Check>],
) -> Result<Vec<CheckResult>, EngineError> {
    let mut results = Vec::with_capacity(checks.len());
    for check in execution_order(checks) {
        let definition = check.definition();
        let raw = check
            .run(ctx)
            .await
            .map_err(|source| EngineError::CheckFault {
                check_id: definition.id.to_string(),
                source,
            })?;
        let result = CheckResult::normalize(ctx.options.profile, definition, raw);
        assert_runtime_contract(&result)?;
        if result.degradation {
            warn!(check_id = %result.check_id, reason_code = ?result.reason_code, "degraded source");
        }
        debug!(
            check_id = %result.check_id,
            status = %result.status,
            reason_code = ?result.reason_code,
            "check finished"
        );
        results.push(result);
    }
    Ok(results)
}
