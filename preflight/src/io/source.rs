//! Vocabulary shared by the read adapters.

use chrono::{SecondsFormat, Utc};

/// A source could not be read. Carries a machine reason code.
///
/// Adapters classify transport problems into this type instead of returning
/// errors, so checks can report them as degraded evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFailure {
    pub reason_code: &'static str,
    pub details: String,
}

impl ReadFailure {
    pub fn new(reason_code: &'static str, details: impl Into<String>) -> Self {
        Self {
            reason_code,
            details: details.into(),
        }
    }
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Request id with a millisecond suffix, e.g. `solana-health-1718000000000`.
pub fn request_id(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_utc_millis() {
        let stamp = now_timestamp();
        assert!(stamp.ends_with('Z'), "{stamp}");
        assert_eq!(stamp.len(), "2024-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn request_id_keeps_prefix() {
        assert!(request_id("solana-peer-exists").starts_with("solana-peer-exists-"));
    }
}
