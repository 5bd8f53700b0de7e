//! Directional peer-registration records and the per-run lookup snapshot.

use std::collections::HashMap;

use serde_json::{Number, Value};

use crate::core::chain::{direction_key, normalize_chain};

/// One direction of a peer registration, e.g. `solana -> ethereum`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalRegistration {
    pub from: String,
    pub to: String,
    pub registered: bool,
    /// Absent for sources that only observe existence.
    pub decimals: Option<Number>,
    pub peer_address: Option<String>,
}

impl DirectionalRegistration {
    /// Existence-only record, as produced by on-chain reads.
    pub fn existence(from: &str, to: &str, registered: bool) -> Self {
        Self {
            from: normalize_chain(from),
            to: normalize_chain(to),
            registered,
            decimals: None,
            peer_address: None,
        }
    }

    pub fn key(&self) -> String {
        direction_key(&self.from, &self.to)
    }
}

/// Parse the `registrations` array of a mock-chain fixture document.
///
/// The error string is the human-readable shape violation, naming the first
/// offending entry.
pub fn parse_fixture(root: &Value) -> Result<Vec<DirectionalRegistration>, String> {
    let Some(root) = root.as_object() else {
        return Err("Mock fixture root must be an object.".to_string());
    };
    let Some(raw) = root.get("registrations").and_then(Value::as_array) else {
        return Err("Mock fixture must include registrations array.".to_string());
    };

    let mut entries = Vec::with_capacity(raw.len());
    for (idx, item) in raw.iter().enumerate() {
        let Some(item) = item.as_object() else {
            return Err(format!("registrations[{idx}] must be an object."));
        };
        let from = item.get("from").and_then(Value::as_str);
        let to = item.get("to").and_then(Value::as_str);
        let registered = item.get("registered").and_then(Value::as_bool);
        let (Some(from), Some(to), Some(registered)) = (from, to, registered) else {
            return Err(format!(
                "registrations[{idx}] requires string from/to and boolean registered fields."
            ));
        };

        entries.push(DirectionalRegistration {
            from: normalize_chain(from),
            to: normalize_chain(to),
            registered,
            decimals: item
                .get("decimals")
                .and_then(Value::as_number)
                .cloned(),
            peer_address: item
                .get("peerAddress")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }
    Ok(entries)
}

/// Registration records keyed by `from->to`. Later records replace earlier
/// ones for the same direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationSnapshot {
    by_direction: HashMap<String, DirectionalRegistration>,
}

impl RegistrationSnapshot {
    pub fn insert(&mut self, record: DirectionalRegistration) {
        self.by_direction.insert(record.key(), record);
    }

    pub fn get(&self, key: &str) -> Option<&DirectionalRegistration> {
        self.by_direction.get(key)
    }

    /// Registered flag for a direction; absent directions count as missing.
    pub fn is_registered(&self, key: &str) -> bool {
        self.get(key).is_some_and(|record| record.registered)
    }

    pub fn len(&self) -> usize {
        self.by_direction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_direction.is_empty()
    }
}

impl FromIterator<DirectionalRegistration> for RegistrationSnapshot {
    fn from_iter<I: IntoIterator<Item = DirectionalRegistration>>(iter: I) -> Self {
        let mut snapshot = Self::default();
        for record in iter {
            snapshot.insert(record);
        }
        snapshot
    }
}
