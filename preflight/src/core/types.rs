//! Shared deterministic types for the preflight core.
//!
//! These types define stable contracts between the runner, the checks and the
//! report/plan builders. Their serialized spellings are part of the report
//! format and must not change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome classification of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuntimeStatus {
    /// The assertion held against the observed source.
    Pass,
    /// The source was assessed and found wanting.
    Fail,
    /// The source could not be assessed.
    Skipped,
}

impl RuntimeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeStatus::Pass => "PASS",
            RuntimeStatus::Fail => "FAIL",
            RuntimeStatus::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failing check stops a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeverityClass {
    Blocking,
    /// Informational only: may PASS or be SKIPPED, never FAIL.
    NonBlocking,
}

impl SeverityClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityClass::Blocking => "blocking",
            SeverityClass::NonBlocking => "non-blocking",
        }
    }
}

impl fmt::Display for SeverityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named deployment scenario selecting an ordered check list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileName {
    NttGeneric,
    SunriseExecutor,
}

impl ProfileName {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileName::NttGeneric => "ntt-generic",
            ProfileName::SunriseExecutor => "sunrise-executor",
        }
    }

    /// Parse a profile name; unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ntt-generic" => Some(ProfileName::NttGeneric),
            "sunrise-executor" => Some(ProfileName::SunriseExecutor),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy deciding which results make `ci_should_fail` true.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    /// Any FAIL from a blocking check.
    #[default]
    Blocking,
    /// Any FAIL.
    All,
    /// Never.
    None,
}

impl FailOn {
    pub fn as_str(self) -> &'static str {
        match self {
            FailOn::Blocking => "blocking",
            FailOn::All => "all",
            FailOn::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        let encoded = serde_json::to_string(&RuntimeStatus::Skipped).expect("encode");
        assert_eq!(encoded, "\"SKIPPED\"");
    }

    #[test]
    fn severity_serializes_kebab_case() {
        let encoded = serde_json::to_string(&SeverityClass::NonBlocking).expect("encode");
        assert_eq!(encoded, "\"non-blocking\"");
    }

    #[test]
    fn profile_parse_rejects_unknown_names() {
        assert_eq!(
            ProfileName::parse("sunrise-executor"),
            Some(ProfileName::SunriseExecutor)
        );
        assert_eq!(ProfileName::parse("Sunrise-Executor"), None);
        assert_eq!(ProfileName::parse(""), None);
    }
}
