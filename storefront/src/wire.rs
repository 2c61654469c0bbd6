//! Storefront Ajax API payloads (`/cart.js`, `/products.json`,
//! `/cart/add.js`, `/cart/change.js`).

use std::collections::BTreeMap;

use free_sample::cart::{sample_attributes, Attributes, CartLine, CartSnapshot};
use free_sample::catalog::CatalogProduct;
use free_sample::scalars::ID;
use serde::{Deserialize, Serialize};

/// Body of `GET /cart.js`. Prices are in minor units.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AjaxCart {
    #[serde(default)]
    pub items: Vec<AjaxLineItem>,
    pub items_subtotal_price: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AjaxLineItem {
    /// Line item key, stable across quantity changes.
    pub key: String,
    /// Variant id.
    pub id: u64,
    pub product_id: u64,
    pub quantity: u64,
    pub price: u64,
    #[serde(default)]
    pub properties: Option<BTreeMap<String, serde_json::Value>>,
}

impl AjaxLineItem {
    /// Line properties as string attributes. Non-string values are dropped.
    fn attributes(&self) -> Attributes {
        self.properties
            .iter()
            .flatten()
            .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
            .collect()
    }
}

impl From<AjaxCart> for CartSnapshot {
    fn from(cart: AjaxCart) -> Self {
        let lines = cart
            .items
            .iter()
            .map(|item| CartLine {
                line_id: item.key.clone(),
                product_id: item.product_id.to_string(),
                variant_id: item.id.to_string(),
                quantity: item.quantity,
                unit_price_minor_units: item.price,
                attributes: item.attributes(),
            })
            .collect();
        CartSnapshot::new(lines, cart.items_subtotal_price)
    }
}

/// Body of `GET /products.json`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<AjaxProduct>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AjaxProduct {
    pub id: u64,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variants: Vec<AjaxVariant>,
    #[serde(default)]
    pub images: Vec<AjaxImage>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AjaxVariant {
    pub id: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AjaxImage {
    pub src: String,
}

impl AjaxProduct {
    /// Products without a variant cannot be added to a cart and are skipped.
    pub fn into_catalog_product(self) -> Option<CatalogProduct> {
        let variant = self.variants.first()?;
        Some(CatalogProduct {
            product_id: self.id.to_string(),
            variant_id: variant.id.to_string(),
            image_url: self.images.into_iter().next().map(|image| image.src),
            title: self.title,
            handle: self.handle,
            tags: self.tags,
        })
    }
}

impl ProductsPage {
    pub fn into_catalog(self) -> Vec<CatalogProduct> {
        self.products
            .into_iter()
            .filter_map(AjaxProduct::into_catalog_product)
            .collect()
    }
}

/// Body of `POST /cart/add.js`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AddItemRequest {
    pub id: ID,
    pub quantity: u64,
    pub properties: Attributes,
}

impl AddItemRequest {
    /// One unit of `variant_id`, carrying the sample line attribute.
    pub fn sample(variant_id: impl Into<ID>) -> Self {
        Self {
            id: variant_id.into(),
            quantity: 1,
            properties: sample_attributes(),
        }
    }
}

/// Body of `POST /cart/change.js`, addressing the line by its key.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChangeLineRequest {
    pub id: String,
    pub quantity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_json_to_snapshot() {
        let cart: AjaxCart = serde_json::from_str(
            r#"{
                "items_subtotal_price": 9000,
                "items": [
                    {
                        "key": "111:abc",
                        "id": 111,
                        "product_id": 11,
                        "quantity": 2,
                        "price": 4500,
                        "properties": null
                    },
                    {
                        "key": "222:def",
                        "id": 222,
                        "product_id": 22,
                        "quantity": 1,
                        "price": 0,
                        "properties": { "_free_sample": "true", "_gift_count": 3 }
                    }
                ]
            }"#,
        )
        .unwrap();

        let snapshot = CartSnapshot::from(cart);
        assert_eq!(snapshot.subtotal_minor_units, 9000);
        assert_eq!(snapshot.lines[0].line_id, "111:abc");
        assert!(!snapshot.lines[0].is_sample());
        assert_eq!(snapshot.lines[1].variant_id, "222");
        assert!(snapshot.lines[1].is_sample());
        assert_eq!(snapshot.lines[1].attributes.len(), 1);
    }

    #[test]
    fn test_products_json_to_catalog() {
        let page: ProductsPage = serde_json::from_str(
            r#"{
                "products": [
                    {
                        "id": 1,
                        "title": "Lip Balm Mini",
                        "handle": "lip-balm-mini",
                        "tags": ["free-sample"],
                        "variants": [{ "id": 101 }, { "id": 102 }],
                        "images": [{ "src": "https://cdn.shopify.com/lip.png" }]
                    },
                    { "id": 2, "title": "Gift Card", "handle": "gift-card", "variants": [] }
                ]
            }"#,
        )
        .unwrap();

        let catalog = page.into_catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].variant_id, "101");
        assert_eq!(
            catalog[0].image_url.as_deref(),
            Some("https://cdn.shopify.com/lip.png")
        );
        assert!(catalog[0].is_sample_eligible());
    }

    #[test]
    fn test_sample_add_payload_is_exact() {
        let body = serde_json::to_string(&AddItemRequest::sample("40123")).unwrap();
        assert_eq!(
            body,
            r#"{"id":"40123","quantity":1,"properties":{"_free_sample":"true"}}"#
        );
    }
}
