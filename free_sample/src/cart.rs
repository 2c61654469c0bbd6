//! Cart snapshot model.
//!
//! A snapshot is what the platform reported for the cart at one moment. It is
//! never cached across decisions: every decision is computed from, and only
//! valid for, the snapshot it was given.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scalars::ID;

/// Line attribute that marks a cart line as a free sample. Clients adding a
/// sample line must send exactly this key and [`SAMPLE_ATTRIBUTE_VALUE`].
pub const SAMPLE_ATTRIBUTE_KEY: &str = "_free_sample";
pub const SAMPLE_ATTRIBUTE_VALUE: &str = "true";

pub type Attributes = BTreeMap<String, String>;

/// The attributes carried by every sample line.
pub fn sample_attributes() -> Attributes {
    Attributes::from([(
        SAMPLE_ATTRIBUTE_KEY.to_string(),
        SAMPLE_ATTRIBUTE_VALUE.to_string(),
    )])
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub line_id: ID,
    pub product_id: ID,
    pub variant_id: ID,
    pub quantity: u64,
    pub unit_price_minor_units: u64,
    #[serde(default)]
    pub attributes: Attributes,
}

impl CartLine {
    /// Whether this line is a free sample. The attribute comparison is exact
    /// and case-sensitive.
    pub fn is_sample(&self) -> bool {
        self.attributes
            .get(SAMPLE_ATTRIBUTE_KEY)
            .is_some_and(|value| value == SAMPLE_ATTRIBUTE_VALUE)
    }

    pub fn line_total_minor_units(&self) -> u64 {
        self.quantity.saturating_mul(self.unit_price_minor_units)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    /// Platform-computed subtotal. Trusted as reported.
    pub subtotal_minor_units: u64,
}

impl CartSnapshot {
    pub fn new(lines: Vec<CartLine>, subtotal_minor_units: u64) -> Self {
        Self {
            lines,
            subtotal_minor_units,
        }
    }

    /// Builds a snapshot whose subtotal is the sum of its line totals.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let subtotal_minor_units = lines
            .iter()
            .map(CartLine::line_total_minor_units)
            .fold(0u64, u64::saturating_add);
        Self::new(lines, subtotal_minor_units)
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.line_id == line_id)
    }

    pub fn sample_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.is_sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: u64, price: u64, attributes: Attributes) -> CartLine {
        CartLine {
            line_id: id.to_string(),
            product_id: format!("product-{id}"),
            variant_id: format!("variant-{id}"),
            quantity,
            unit_price_minor_units: price,
            attributes,
        }
    }

    #[test]
    fn test_sample_attribute_is_exact() {
        assert!(line("1", 1, 500, sample_attributes()).is_sample());
        assert!(!line("2", 1, 500, Attributes::new()).is_sample());

        let upper = Attributes::from([(SAMPLE_ATTRIBUTE_KEY.to_string(), "TRUE".to_string())]);
        assert!(!line("3", 1, 500, upper).is_sample());

        let other_key = Attributes::from([("_Free_Sample".to_string(), "true".to_string())]);
        assert!(!line("4", 1, 500, other_key).is_sample());
    }

    #[test]
    fn test_from_lines_sums_subtotal() {
        let snapshot = CartSnapshot::from_lines(vec![
            line("1", 2, 2500, Attributes::new()),
            line("2", 1, 4000, sample_attributes()),
        ]);
        assert_eq!(snapshot.subtotal_minor_units, 9000);
        assert_eq!(snapshot.sample_lines().count(), 1);
        assert_eq!(snapshot.line("2").map(|l| l.quantity), Some(1));
        assert!(snapshot.line("missing").is_none());
    }

    #[test]
    fn test_json_deserialization() {
        let snapshot: CartSnapshot = serde_json::from_str(
            r#"{
                "lines": [{
                    "lineId": "gid://shopify/CartLine/1",
                    "productId": "gid://shopify/Product/1",
                    "variantId": "gid://shopify/ProductVariant/1",
                    "quantity": 1,
                    "unitPriceMinorUnits": 1200
                }],
                "subtotalMinorUnits": 1200
            }"#,
        )
        .unwrap();
        assert!(snapshot.lines[0].attributes.is_empty());
        assert_eq!(snapshot.subtotal_minor_units, 1200);
    }
}
