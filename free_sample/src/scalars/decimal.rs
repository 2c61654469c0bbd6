use serde::{Deserialize, Serialize};
use std::{ops::Deref, str::FromStr};

/// Convenience wrapper for converting between Shopify's `Decimal` scalar, which
/// is serialized as a `String`, and Rust's `f64`.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Copy)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct Decimal(pub f64);

impl Decimal {
    /// Access the value as an `f64`
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Converts a currency amount to minor units (cents), rounding half away
    /// from zero. Negative and non-finite amounts have no minor-unit form.
    ///
    /// Rounding works on the shortest decimal rendering of the value, so
    /// `1.005` is 101 cents even though `1.005 * 100.0` is below 100.5.
    pub fn to_minor_units(&self) -> Option<u64> {
        if !self.0.is_finite() || self.0 < 0.0 {
            return None;
        }
        if self.0 == 0.0 {
            return Some(0);
        }
        let mut buffer = ryu::Buffer::new();
        let text = buffer.format_finite(self.0);
        let (mantissa, exponent) = match text.split_once('e') {
            Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
            None => (text, 0),
        };
        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let digits: Vec<u64> = whole
            .bytes()
            .chain(fraction.bytes())
            .map(|b| u64::from(b - b'0'))
            .collect();
        let digit = |index: i64| -> u64 {
            usize::try_from(index)
                .ok()
                .and_then(|index| digits.get(index).copied())
                .unwrap_or(0)
        };

        // Decimal point position once scaled by 100.
        let point = whole.len() as i64 + exponent + 2;
        let mut cents: u64 = 0;
        for index in 0..point.max(0) {
            cents = cents.checked_mul(10)?.checked_add(digit(index))?;
        }
        if point >= 0 && digit(point) >= 5 {
            cents = cents.checked_add(1)?;
        }
        Some(cents)
    }

    /// Renders the value without a trailing `.0`, the way merchants type it.
    pub fn to_plain_string(&self) -> String {
        let s = String::from(*self);
        match s.strip_suffix(".0") {
            Some(whole) => whole.to_string(),
            None => s,
        }
    }
}

impl Deref for Decimal {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Decimal {
    type Err = std::num::ParseFloatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        f64::from_str(value.trim()).map(Self)
    }
}

impl TryFrom<String> for Decimal {
    type Error = std::num::ParseFloatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> Self {
        ryu::Buffer::new().format(value.0).to_string()
    }
}

impl From<Decimal> for f64 {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<f64> for Decimal {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Decimal;

    #[test]
    fn test_json_deserialization() {
        let decimal_value = serde_json::json!("123.4");
        let decimal: Decimal =
            serde_json::from_value(decimal_value).expect("Error deserializing from JSON");
        assert_eq!(123.4, decimal.as_f64());
    }

    #[test]
    fn test_json_serialization() {
        let decimal = Decimal(123.4);
        let json_value = serde_json::to_value(decimal).expect("Error serializing to JSON");
        assert_eq!(serde_json::json!("123.4"), json_value);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Decimal(100.0).to_minor_units(), Some(10000));
        assert_eq!(Decimal(49.99).to_minor_units(), Some(4999));
        assert_eq!(Decimal(0.005).to_minor_units(), Some(1));
        assert_eq!(Decimal(-1.0).to_minor_units(), None);
        assert_eq!(Decimal(f64::NAN).to_minor_units(), None);
    }

    #[test]
    fn test_minor_units_round_half_cents_up() {
        assert_eq!(Decimal(1.005).to_minor_units(), Some(101));
        assert_eq!(Decimal(2.675).to_minor_units(), Some(268));
        assert_eq!(Decimal(0.004).to_minor_units(), Some(0));
        assert_eq!(Decimal(0.29).to_minor_units(), Some(29));
        assert_eq!(Decimal(-0.0).to_minor_units(), Some(0));
        assert_eq!(Decimal(1e-7).to_minor_units(), Some(0));
        assert_eq!(Decimal(1.5e21).to_minor_units(), None);
        assert_eq!("1.005".parse::<Decimal>().unwrap().to_minor_units(), Some(101));
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(Decimal(100.0).to_plain_string(), "100");
        assert_eq!(Decimal(49.99).to_plain_string(), "49.99");
    }
}
