//! Merchant-configured promotion settings.
//!
//! Settings are persisted as shop metafields under [`SETTINGS_NAMESPACE`] with
//! string values. Decoding never fails: a missing or malformed field falls
//! back to its documented default.

use serde::{Deserialize, Serialize};

use crate::scalars::Decimal;

pub const SETTINGS_NAMESPACE: &str = "free_sample_settings";
pub const THRESHOLD_KEY: &str = "threshold";
pub const SAMPLE_LIMIT_KEY: &str = "product_limit";

pub const DEFAULT_THRESHOLD: f64 = 100.0;
pub const DEFAULT_SAMPLE_LIMIT: u64 = 2;

/// Spending threshold and per-order sample limit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PolicyFields", into = "PolicyFields")]
pub struct Policy {
    threshold: Decimal,
    sample_limit: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            threshold: Decimal(DEFAULT_THRESHOLD),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl Policy {
    /// Builds a policy, replacing an invalid threshold (negative or not
    /// finite) with the default.
    pub fn new(threshold: f64, sample_limit: u64) -> Self {
        Self {
            threshold: valid_threshold(Decimal(threshold)).unwrap_or(Decimal(DEFAULT_THRESHOLD)),
            sample_limit,
        }
    }

    /// Decodes the policy from `(key, value)` metafield pairs.
    pub fn from_metafields<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut policy = Self::default();
        for (key, value) in entries {
            match key {
                THRESHOLD_KEY => {
                    if let Some(threshold) = parse_threshold(value) {
                        policy.threshold = threshold;
                    }
                }
                SAMPLE_LIMIT_KEY => {
                    if let Some(limit) = parse_sample_limit(value) {
                        policy.sample_limit = limit;
                    }
                }
                _ => {}
            }
        }
        policy
    }

    /// Encodes the policy as metafield `(key, value)` pairs.
    pub fn to_metafields(&self) -> [(&'static str, String); 2] {
        [
            (THRESHOLD_KEY, self.threshold.to_plain_string()),
            (SAMPLE_LIMIT_KEY, self.sample_limit.to_string()),
        ]
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    pub fn sample_limit(&self) -> u64 {
        self.sample_limit
    }

    /// The threshold in minor units, `round(threshold * 100)`.
    pub fn threshold_minor_units(&self) -> u64 {
        // Invariant: `threshold` passed `valid_threshold`.
        self.threshold.to_minor_units().unwrap_or_default()
    }
}

fn valid_threshold(threshold: Decimal) -> Option<Decimal> {
    threshold.to_minor_units().map(|_| threshold)
}

fn parse_threshold(value: &str) -> Option<Decimal> {
    value.parse::<Decimal>().ok().and_then(valid_threshold)
}

fn parse_sample_limit(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Wire shape of the settings blob, keyed like the metafields. Values arrive
/// as strings, but plain JSON numbers are accepted too.
#[derive(Default, Serialize, Deserialize)]
struct PolicyFields {
    #[serde(default)]
    threshold: Option<serde_json::Value>,
    #[serde(default, alias = "productLimit")]
    product_limit: Option<serde_json::Value>,
}

fn field_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<PolicyFields> for Policy {
    fn from(fields: PolicyFields) -> Self {
        let threshold = fields.threshold.as_ref().and_then(field_text);
        let limit = fields.product_limit.as_ref().and_then(field_text);
        let entries = threshold
            .as_deref()
            .map(|v| (THRESHOLD_KEY, v))
            .into_iter()
            .chain(limit.as_deref().map(|v| (SAMPLE_LIMIT_KEY, v)));
        Policy::from_metafields(entries)
    }
}

impl From<Policy> for PolicyFields {
    fn from(policy: Policy) -> Self {
        let [(_, threshold), (_, limit)] = policy.to_metafields();
        Self {
            threshold: Some(serde_json::Value::String(threshold)),
            product_limit: Some(serde_json::Value::String(limit)),
        }
    }
}
