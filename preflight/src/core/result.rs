//! Canonical result shape every check emits.
//!
//! A check produces a [`RawCheckResult`]; the runner attaches the check
//! identity via [`CheckResult::normalize`] before the result is validated and
//! appended to the run output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::types::{ProfileName, RuntimeStatus, SeverityClass};

/// Static identity of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDefinition {
    /// Stable identifier, consumed by remediation mapping.
    pub id: &'static str,
    pub severity_class: SeverityClass,
    /// Deterministic checks read only local inputs and run first.
    pub deterministic: bool,
}

/// Marker describing when (and through which request) evidence was retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetrievalMarker {
    Timestamp(String),
    Request { timestamp: String, request_id: String },
}

impl RetrievalMarker {
    pub fn at(timestamp: impl Into<String>) -> Self {
        RetrievalMarker::Timestamp(timestamp.into())
    }

    pub fn request(timestamp: impl Into<String>, request_id: impl Into<String>) -> Self {
        RetrievalMarker::Request {
            timestamp: timestamp.into(),
            request_id: request_id.into(),
        }
    }
}

/// Structured evidence payload: what was asserted, against which values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceData {
    pub source: String,
    pub assertion_basis: String,
    pub observed: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    pub retrieval_marker: RetrievalMarker,
    pub degradation: bool,
}

impl EvidenceData {
    pub fn new(
        source: impl Into<String>,
        assertion_basis: impl Into<String>,
        retrieval_marker: RetrievalMarker,
    ) -> Self {
        Self {
            source: source.into(),
            assertion_basis: assertion_basis.into(),
            observed: Value::Object(Default::default()),
            expected: None,
            retrieval_marker,
            degradation: false,
        }
    }

    pub fn observed(mut self, observed: Value) -> Self {
        self.observed = observed;
        self
    }

    pub fn expected(mut self, expected: Value) -> Self {
        self.expected = Some(expected);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckEvidence {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EvidenceData>,
}

impl CheckEvidence {
    pub fn new(summary: impl Into<String>, data: EvidenceData) -> Self {
        Self {
            summary: summary.into(),
            data: Some(data),
        }
    }

    pub fn summary_only(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            data: None,
        }
    }

    fn with_degradation(mut self, degradation: bool) -> Self {
        if let Some(data) = self.data.as_mut() {
            data.degradation = degradation;
        }
        self
    }
}

/// Result as produced by a check, before the runner attaches its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCheckResult {
    pub status: RuntimeStatus,
    pub reason_code: Option<String>,
    pub details: String,
    pub evidence: CheckEvidence,
    pub degradation: bool,
    pub source: String,
}

impl RawCheckResult {
    pub fn pass(details: impl Into<String>, evidence: CheckEvidence, source: &str) -> Self {
        Self {
            status: RuntimeStatus::Pass,
            reason_code: None,
            details: details.into(),
            evidence: evidence.with_degradation(false),
            degradation: false,
            source: source.to_string(),
        }
    }

    /// Assessed and found wanting; evidence is complete.
    pub fn fail(
        reason_code: impl Into<String>,
        details: impl Into<String>,
        evidence: CheckEvidence,
        source: &str,
    ) -> Self {
        Self {
            status: RuntimeStatus::Fail,
            reason_code: Some(reason_code.into()),
            details: details.into(),
            evidence: evidence.with_degradation(false),
            degradation: false,
            source: source.to_string(),
        }
    }

    /// Could not be assessed; evidence is degraded.
    pub fn skipped(
        reason_code: impl Into<String>,
        details: impl Into<String>,
        evidence: CheckEvidence,
        source: &str,
    ) -> Self {
        Self {
            status: RuntimeStatus::Skipped,
            reason_code: Some(reason_code.into()),
            details: details.into(),
            evidence: evidence.with_degradation(true),
            degradation: true,
            source: source.to_string(),
        }
    }
}

/// Normalized result: the shape persisted in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub profile: ProfileName,
    pub status: RuntimeStatus,
    pub severity_class: SeverityClass,
    pub reason_code: Option<String>,
    pub details: String,
    pub evidence: CheckEvidence,
    pub degradation: bool,
    pub source: String,
}

impl CheckResult {
    pub fn normalize(profile: ProfileName, check: &CheckDefinition, raw: RawCheckResult) -> Self {
        Self {
            check_id: check.id.to_string(),
            profile,
            status: raw.status,
            severity_class: check.severity_class,
            reason_code: raw.reason_code,
            details: raw.details,
            evidence: raw.evidence,
            degradation: raw.degradation,
            source: raw.source,
        }
    }
}
