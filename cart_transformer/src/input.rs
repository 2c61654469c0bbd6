//! Function input, matching the selection in `run.graphql`.

use free_sample::cart::{Attributes, CartLine as PolicyLine, CartSnapshot};
use free_sample::scalars::{Decimal, Int, ID};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub cart: Cart,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ID,
    pub quantity: Int,
    pub attribute: Option<Attribute>,
    pub merchandise: Merchandise,
    pub cost: CartLineCost,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "__typename")]
pub enum Merchandise {
    ProductVariant { id: ID, product: Product },
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Product {
    pub id: ID,
    pub title: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCost {
    pub amount_per_quantity: MoneyV2,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: Decimal,
    pub currency_code: String,
}

impl CartLine {
    fn into_policy_line(self) -> PolicyLine {
        let (variant_id, product_id) = match self.merchandise {
            Merchandise::ProductVariant { id, product } => (id, product.id),
            Merchandise::Other => (ID::new(), ID::new()),
        };
        let attributes: Attributes = self
            .attribute
            .and_then(|attribute| Some((attribute.key, attribute.value?)))
            .into_iter()
            .collect();
        PolicyLine {
            line_id: self.id,
            product_id,
            variant_id,
            quantity: u64::try_from(self.quantity).unwrap_or(0),
            unit_price_minor_units: self
                .cost
                .amount_per_quantity
                .amount
                .to_minor_units()
                .unwrap_or(0),
            attributes,
        }
    }
}

impl Cart {
    pub fn into_snapshot(self) -> CartSnapshot {
        CartSnapshot::from_lines(
            self.lines
                .into_iter()
                .map(CartLine::into_policy_line)
                .collect(),
        )
    }
}
