//! Cross-direction correlation of registration state.
//!
//! Both evaluations walk the expected pairs in order and stop at the first
//! failing pair, so the report names exactly one root cause.

use serde_json::Number;

use crate::core::chain::ChainPair;
use crate::core::registration::RegistrationSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum SymmetryOutcome {
    Symmetric {
        checked_pairs: Vec<String>,
    },
    Asymmetric {
        pair: ChainPair,
        forward_registered: bool,
        reverse_registered: bool,
    },
}

pub fn evaluate_symmetry(pairs: &[ChainPair], snapshot: &RegistrationSnapshot) -> SymmetryOutcome {
    for pair in pairs {
        let forward = snapshot.is_registered(&pair.forward_key());
        let reverse = snapshot.is_registered(&pair.reverse_key());
        if forward != reverse {
            return SymmetryOutcome::Asymmetric {
                pair: pair.clone(),
                forward_registered: forward,
                reverse_registered: reverse,
            };
        }
    }
    SymmetryOutcome::Symmetric {
        checked_pairs: pairs.iter().map(ChainPair::label).collect(),
    }
}

/// `Solana->Eth: REGISTERED / Eth->Solana: MISSING`
pub fn asymmetry_line(pair: &ChainPair, forward: bool, reverse: bool) -> String {
    format!(
        "{}: {} / {}: {}",
        pair.forward_title(),
        registration_word(forward),
        pair.reverse_title(),
        registration_word(reverse)
    )
}

fn registration_word(registered: bool) -> &'static str {
    if registered { "REGISTERED" } else { "MISSING" }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecimalsOutcome {
    Synced {
        checked_pairs: Vec<String>,
    },
    /// A direction is absent or not registered.
    RegistrationMissing {
        pair: ChainPair,
        forward_registered: Option<bool>,
        reverse_registered: Option<bool>,
    },
    /// Both directions registered, but at least one lacks decimals.
    DecimalsMissing {
        pair: ChainPair,
        forward_decimals: Option<Number>,
        reverse_decimals: Option<Number>,
    },
    Mismatch {
        pair: ChainPair,
        forward_decimals: Number,
        reverse_decimals: Number,
    },
}

pub fn evaluate_decimals(pairs: &[ChainPair], snapshot: &RegistrationSnapshot) -> DecimalsOutcome {
    for pair in pairs {
        let forward = snapshot.get(&pair.forward_key());
        let reverse = snapshot.get(&pair.reverse_key());

        let (Some(forward), Some(reverse)) = (forward, reverse) else {
            return DecimalsOutcome::RegistrationMissing {
                pair: pair.clone(),
                forward_registered: forward.map(|record| record.registered),
                reverse_registered: reverse.map(|record| record.registered),
            };
        };
        if !forward.registered || !reverse.registered {
            return DecimalsOutcome::RegistrationMissing {
                pair: pair.clone(),
                forward_registered: Some(forward.registered),
                reverse_registered: Some(reverse.registered),
            };
        }

        let (Some(forward_decimals), Some(reverse_decimals)) =
            (forward.decimals.as_ref(), reverse.decimals.as_ref())
        else {
            return DecimalsOutcome::DecimalsMissing {
                pair: pair.clone(),
                forward_decimals: forward.decimals.clone(),
                reverse_decimals: reverse.decimals.clone(),
            };
        };

        if forward_decimals.as_f64() != reverse_decimals.as_f64() {
            return DecimalsOutcome::Mismatch {
                pair: pair.clone(),
                forward_decimals: forward_decimals.clone(),
                reverse_decimals: reverse_decimals.clone(),
            };
        }
    }
    DecimalsOutcome::Synced {
        checked_pairs: pairs.iter().map(ChainPair::label).collect(),
    }
}

/// `Solana->Eth decimals=9 / Eth->Solana decimals=6 (MISMATCH)`
pub fn decimals_mismatch_line(pair: &ChainPair, forward: &Number, reverse: &Number) -> String {
    format!(
        "{} decimals={} / {} decimals={} (MISMATCH)",
        pair.forward_title(),
        decimals_text(forward),
        pair.reverse_title(),
        decimals_text(reverse)
    )
}

/// Integral floats print without a fraction: `9.0` -> `9`.
fn decimals_text(decimals: &Number) -> String {
    match decimals.as_f64() {
        Some(value) if decimals.is_f64() => value.to_string(),
        _ => decimals.to_string(),
    }
}
