//! Shape rules for the `peers` section and the manager program id.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static PEER_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-_]*$").expect("peer key regex"));
static EVM_ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("evm address regex"));
static PROGRAM_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("program id regex")
});

pub const KEY_RULES: [&str; 4] = [
    "string",
    "non-empty after trim",
    "equals key.trim()",
    "matches ^[a-z0-9][a-z0-9-_]*$",
];

pub const VALUE_RULES: [&str; 3] = [
    "string",
    "non-empty after trim",
    "if startsWith(0x) -> ^0x[a-fA-F0-9]{40}$",
];

pub const PROGRAM_ID_PATTERN: &str = "^[1-9A-HJ-NP-Za-km-z]{32,44}$";

/// Validate one `peers` key. Returns the human-readable reason on rejection.
pub fn validate_peer_key(key: &str) -> Result<(), &'static str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err("key must be non-empty after trim");
    }
    if trimmed != key {
        return Err("key must not have leading or trailing spaces");
    }
    if !PEER_KEY_RE.is_match(key) {
        return Err("key must match ^[a-z0-9][a-z0-9-_]*$");
    }
    Ok(())
}

/// Validate one `peers` value.
pub fn validate_peer_value(value: &Value) -> Result<(), &'static str> {
    let Some(text) = value.as_str() else {
        return Err("value must be a string");
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("value must be non-empty after trim");
    }
    if trimmed.starts_with("0x") && !EVM_ADDRESS_RE.is_match(trimmed) {
        return Err("0x-prefixed value must match ^0x[a-fA-F0-9]{40}$");
    }
    Ok(())
}

pub fn is_program_id(value: &str) -> bool {
    PROGRAM_ID_RE.is_match(value)
}

/// The `peers` section as found in a parsed config document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeerSection<'a> {
    /// Root is not an object, or it has no `peers` field.
    Missing,
    /// `peers` is present but not a (non-array) object.
    Invalid(&'a Value),
    Empty,
    Entries(&'a Map<String, Value>),
}

pub fn peer_section(root: &Value) -> PeerSection<'_> {
    let Some(peers) = root.as_object().and_then(|obj| obj.get("peers")) else {
        return PeerSection::Missing;
    };
    match peers.as_object() {
        None => PeerSection::Invalid(peers),
        Some(map) if map.is_empty() => PeerSection::Empty,
        Some(map) => PeerSection::Entries(map),
    }
}

/// JavaScript-flavoured type name of a JSON value, used in evidence.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_with_trailing_space_is_rejected() {
        assert_eq!(
            validate_peer_key("Eth "),
            Err("key must not have leading or trailing spaces")
        );
    }

    #[test]
    fn slug_key_is_accepted() {
        assert_eq!(validate_peer_key("eth-base"), Ok(()));
        assert_eq!(validate_peer_key("arbitrum_one"), Ok(()));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert_eq!(validate_peer_key(""), Err("key must be non-empty after trim"));
        assert_eq!(
            validate_peer_key("   "),
            Err("key must be non-empty after trim")
        );
    }

    #[test]
    fn uppercase_key_fails_pattern() {
        assert_eq!(
            validate_peer_key("Eth"),
            Err("key must match ^[a-z0-9][a-z0-9-_]*$")
        );
        assert_eq!(
            validate_peer_key("-eth"),
            Err("key must match ^[a-z0-9][a-z0-9-_]*$")
        );
    }

    #[test]
    fn peer_values_follow_shape_rules() {
        assert_eq!(
            validate_peer_value(&json!("0x1111111111111111111111111111111111111111")),
            Ok(())
        );
        assert_eq!(validate_peer_value(&json!("SoLaNaPeer")), Ok(()));
        assert_eq!(
            validate_peer_value(&json!("0x1234")),
            Err("0x-prefixed value must match ^0x[a-fA-F0-9]{40}$")
        );
        assert_eq!(validate_peer_value(&json!(7)), Err("value must be a string"));
        assert_eq!(
            validate_peer_value(&json!("  ")),
            Err("value must be non-empty after trim")
        );
    }

    #[test]
    fn program_id_requires_base58_length() {
        assert!(is_program_id("NTTManager111111111111111111111111111111111"));
        assert!(!is_program_id("0OIl"));
        assert!(!is_program_id("NTTManager11111111111111111111110"));
    }

    #[test]
    fn peer_section_classifies_shapes() {
        assert_eq!(peer_section(&json!([])), PeerSection::Missing);
        assert_eq!(peer_section(&json!({})), PeerSection::Missing);
        assert!(matches!(
            peer_section(&json!({ "peers": [] })),
            PeerSection::Invalid(_)
        ));
        assert_eq!(peer_section(&json!({ "peers": {} })), PeerSection::Empty);
        assert!(matches!(
            peer_section(&json!({ "peers": { "eth": "0x" } })),
            PeerSection::Entries(map) if map.len() == 1
        ));
    }
}
