//! Static compute-budget threshold for the redeem instruction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Documented redeem baseline plus a safety buffer expressed as a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeBudgetPolicy {
    pub base_minimum: u64,
    pub buffer_numerator: u64,
    pub buffer_denominator: u64,
}

impl Default for ComputeBudgetPolicy {
    fn default() -> Self {
        Self {
            base_minimum: 187_430,
            buffer_numerator: 12,
            buffer_denominator: 10,
        }
    }
}

impl ComputeBudgetPolicy {
    /// `ceil(base_minimum * numerator / denominator)`, in integer arithmetic.
    ///
    /// The denominator is validated non-zero when settings load.
    pub fn required_minimum(&self) -> u64 {
        let scaled = self.base_minimum.saturating_mul(self.buffer_numerator);
        scaled.div_ceil(self.buffer_denominator.max(1))
    }

    pub fn buffer_multiplier(&self) -> f64 {
        self.buffer_numerator as f64 / self.buffer_denominator.max(1) as f64
    }

    pub fn is_satisfied_by(&self, gas_limit: u64) -> bool {
        gas_limit >= self.required_minimum()
    }
}

/// Accept a non-negative integer or a string of ASCII digits.
pub fn parse_gas_limit(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            let float = number.as_f64()?;
            (float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64).then_some(float as u64)
        }),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            trimmed.parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_policy_requires_224916() {
        let policy = ComputeBudgetPolicy::default();
        assert_eq!(policy.required_minimum(), 224_916);
        assert!(policy.is_satisfied_by(224_916));
        assert!(!policy.is_satisfied_by(224_915));
    }

    #[test]
    fn required_minimum_rounds_up() {
        let policy = ComputeBudgetPolicy {
            base_minimum: 7,
            buffer_numerator: 3,
            buffer_denominator: 2,
        };
        assert_eq!(policy.required_minimum(), 11);
    }

    #[test]
    fn gas_limit_accepts_integers_and_digit_strings() {
        assert_eq!(parse_gas_limit(&json!(224916)), Some(224_916));
        assert_eq!(parse_gas_limit(&json!(" 300000 ")), Some(300_000));
        assert_eq!(parse_gas_limit(&json!(250000.0)), Some(250_000));
    }

    #[test]
    fn gas_limit_rejects_other_shapes() {
        assert_eq!(parse_gas_limit(&json!(-1)), None);
        assert_eq!(parse_gas_limit(&json!(1.5)), None);
        assert_eq!(parse_gas_limit(&json!("12a")), None);
        assert_eq!(parse_gas_limit(&json!("")), None);
        assert_eq!(parse_gas_limit(&json!(true)), None);
        assert_eq!(parse_gas_limit(&json!(null)), None);
    }
}
