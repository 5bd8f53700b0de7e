//! Verification report: per-check results plus a CI verdict.

use serde::{Deserialize, Serialize};

use crate::core::result::CheckResult;
use crate::core::types::{FailOn, ProfileName, RuntimeStatus, SeverityClass};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub pass: usize,
    pub fail: usize,
    pub skipped: usize,
    pub total: usize,
    pub ci_should_fail: bool,
}

/// Contents of `report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub generated_at: String,
    pub profile: ProfileName,
    pub fail_on: FailOn,
    pub summary: ReportSummary,
    pub results: Vec<CheckResult>,
}

/// Whether CI should fail under `fail_on` given these results.
pub fn compute_ci_should_fail(results: &[CheckResult], fail_on: FailOn) -> bool {
    let mut failed = results.iter().filter(|r| r.status == RuntimeStatus::Fail);
    match fail_on {
        FailOn::None => false,
        FailOn::All => failed.next().is_some(),
        FailOn::Blocking => failed.any(|r| r.severity_class == SeverityClass::Blocking),
    }
}

impl VerifyReport {
    pub fn new(
        generated_at: String,
        profile: ProfileName,
        fail_on: FailOn,
        results: Vec<CheckResult>,
    ) -> Self {
        let count = |status: RuntimeStatus| results.iter().filter(|r| r.status == status).count();
        let summary = ReportSummary {
            pass: count(RuntimeStatus::Pass),
            fail: count(RuntimeStatus::Fail),
            skipped: count(RuntimeStatus::Skipped),
            total: results.len(),
            ci_should_fail: compute_ci_should_fail(&results, fail_on),
        };
        Self {
            generated_at,
            profile,
            fail_on,
            summary,
            results,
        }
    }

    /// One-line summary printed after `verify`.
    pub fn summary_line(&self) -> String {
        let s = &self.summary;
        format!(
            "[verify] profile={} pass={} fail={} skipped={} total={} CI: {}",
            self.profile,
            s.pass,
            s.fail,
            s.skipped,
            s.total,
            if s.ci_should_fail { "FAIL" } else { "PASS" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::{CheckDefinition, CheckEvidence, RawCheckResult};

    fn result(status: RuntimeStatus, severity_class: SeverityClass) -> CheckResult {
        let definition = CheckDefinition {
            id: "CHK-000-example",
            severity_class,
            deterministic: true,
        };
        let evidence = CheckEvidence::summary_only("summary");
        let raw = match status {
            RuntimeStatus::Pass => RawCheckResult::pass("ok", evidence, "stub"),
            RuntimeStatus::Fail => RawCheckResult::fail("BROKEN", "broken", evidence, "stub"),
            RuntimeStatus::Skipped => RawCheckResult::skipped("DOWN", "down", evidence, "stub"),
        };
        CheckResult::normalize(ProfileName::NttGeneric, &definition, raw)
    }

    #[test]
    fn fail_on_policies() {
        let blocking_fail = [
            result(RuntimeStatus::Pass, SeverityClass::Blocking),
            result(RuntimeStatus::Fail, SeverityClass::Blocking),
        ];
        assert!(compute_ci_should_fail(&blocking_fail, FailOn::Blocking));
        assert!(compute_ci_should_fail(&blocking_fail, FailOn::All));
        assert!(!compute_ci_should_fail(&blocking_fail, FailOn::None));

        let skipped_only = [result(RuntimeStatus::Skipped, SeverityClass::Blocking)];
        assert!(!compute_ci_should_fail(&skipped_only, FailOn::All));
    }

    #[test]
    fn summary_counts_and_line() {
        let report = VerifyReport::new(
            "2024-01-01T00:00:00.000Z".to_string(),
            ProfileName::NttGeneric,
            FailOn::Blocking,
            vec![
                result(RuntimeStatus::Pass, SeverityClass::Blocking),
                result(RuntimeStatus::Fail, SeverityClass::Blocking),
                result(RuntimeStatus::Skipped, SeverityClass::Blocking),
                result(RuntimeStatus::Skipped, SeverityClass::Blocking),
            ],
        );
        assert_eq!(
            report.summary,
            ReportSummary {
                pass: 1,
                fail: 1,
                skipped: 2,
                total: 4,
                ci_should_fail: true
            }
        );
        assert_eq!(
            report.summary_line(),
            "[verify] profile=ntt-generic pass=1 fail=1 skipped=2 total=4 CI: FAIL"
        );
    }

    #[test]
    fn report_serializes_top_level_fields() {
        let report = VerifyReport::new(
            "t0".to_string(),
            ProfileName::SunriseExecutor,
            FailOn::None,
            Vec::new(),
        );
        let value = serde_json::to_value(&report).expect("encode");
        assert_eq!(value["profile"], "sunrise-executor");
        assert_eq!(value["fail_on"], "none");
        assert_eq!(value["summary"]["ci_should_fail"], false);
        assert_eq!(value["results"], serde_json::json!([]));
    }
}
