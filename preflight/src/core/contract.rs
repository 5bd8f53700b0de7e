//! Runtime contract enforced on every normalized result.
//!
//! - non-blocking checks never FAIL
//! - SKIPPED requires a reason code and non-empty details
//! - PASS never carries degraded evidence
//!
//! A violation signals a defect in a check implementation, never a property
//! of the assessed data, so it is fatal to the run.

use thiserror::Error;

use crate::core::result::CheckResult;
use crate::core::types::{RuntimeStatus, SeverityClass};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid result for {check_id}: {rule}")]
pub struct ContractViolation {
    pub check_id: String,
    pub rule: &'static str,
}

pub fn assert_runtime_contract(result: &CheckResult) -> Result<(), ContractViolation> {
    let violation = |rule| ContractViolation {
        check_id: result.check_id.clone(),
        rule,
    };

    if result.severity_class == SeverityClass::NonBlocking && result.status == RuntimeStatus::Fail
    {
        return Err(violation("non-blocking + FAIL is not allowed"));
    }

    if result.status == RuntimeStatus::Skipped {
        if result.reason_code.as_deref().is_none_or(str::is_empty) {
            return Err(violation("SKIPPED requires reason_code"));
        }
        if result.details.trim().is_empty() {
            return Err(violation("SKIPPED requires details"));
        }
    }

    if result.status == RuntimeStatus::Pass && result.degradation {
        return Err(violation("PASS with degradation=true is not allowed"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::CheckEvidence;
    use crate::core::types::ProfileName;

    fn result(
        severity_class: SeverityClass,
        status: RuntimeStatus,
        reason_code: Option<&str>,
        details: &str,
        degradation: bool,
    ) -> CheckResult {
        CheckResult {
            check_id: "CHK-test".to_string(),
            profile: ProfileName::NttGeneric,
            status,
            severity_class,
            reason_code: reason_code.map(str::to_string),
            details: details.to_string(),
            evidence: CheckEvidence::summary_only("evidence"),
            degradation,
            source: "test".to_string(),
        }
    }

    #[test]
    fn rejects_non_blocking_fail() {
        let err = assert_runtime_contract(&result(
            SeverityClass::NonBlocking,
            RuntimeStatus::Fail,
            Some("X"),
            "details",
            false,
        ))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid result for CHK-test: non-blocking + FAIL is not allowed"
        );
    }

    #[test]
    fn rejects_skipped_without_reason_code() {
        let err = assert_runtime_contract(&result(
            SeverityClass::Blocking,
            RuntimeStatus::Skipped,
            None,
            "details",
            true,
        ))
        .unwrap_err();
        assert_eq!(err.rule, "SKIPPED requires reason_code");
    }

    #[test]
    fn rejects_skipped_with_blank_details() {
        let err = assert_runtime_contract(&result(
            SeverityClass::Blocking,
            RuntimeStatus::Skipped,
            Some("CONFIG_NOT_FOUND"),
            "   ",
            true,
        ))
        .unwrap_err();
        assert_eq!(err.rule, "SKIPPED requires details");
    }

    #[test]
    fn rejects_degraded_pass() {
        let err = assert_runtime_contract(&result(
            SeverityClass::Blocking,
            RuntimeStatus::Pass,
            None,
            "ok",
            true,
        ))
        .unwrap_err();
        assert_eq!(err.rule, "PASS with degradation=true is not allowed");
    }

    #[test]
    fn accepts_every_other_combination() {
        let severities = [SeverityClass::Blocking, SeverityClass::NonBlocking];
        let statuses = [
            RuntimeStatus::Pass,
            RuntimeStatus::Fail,
            RuntimeStatus::Skipped,
        ];
        for severity in severities {
            for status in statuses {
                for degradation in [false, true] {
                    let forbidden = (severity == SeverityClass::NonBlocking
                        && status == RuntimeStatus::Fail)
                        || (status == RuntimeStatus::Pass && degradation);
                    let candidate = result(severity, status, Some("CODE"), "details", degradation);
                    assert_eq!(
                        assert_runtime_contract(&candidate).is_ok(),
                        !forbidden,
                        "severity={severity} status={status} degradation={degradation}"
                    );
                }
            }
        }
    }
}
