//! Sample offers shown next to the cart.
//!
//! Offers are rebuilt from scratch on every cart change; carts are small and
//! a full recompute keeps them consistent with the evaluator.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::cart::CartSnapshot;
use crate::catalog::CatalogProduct;
use crate::evaluator::{CartEvaluation, CartPolicyEvaluator, Denial, SampleAdmission};
use crate::policy::Policy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "reason")]
pub enum DisabledReasonHint {
    #[serde(rename_all = "camelCase")]
    Threshold { amount_needed_minor_units: u64 },
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub product: CatalogProduct,
    pub is_in_cart: bool,
    pub is_disabled: bool,
    pub disabled_reason_hint: Option<DisabledReasonHint>,
}

impl Offer {
    pub fn label(&self) -> &'static str {
        if self.is_in_cart {
            "Added ✓"
        } else {
            "Add to Cart"
        }
    }

    /// "Add $X more to unlock", when the threshold is what blocks the offer.
    pub fn unlock_message(&self) -> Option<String> {
        match self.disabled_reason_hint {
            Some(DisabledReasonHint::Threshold {
                amount_needed_minor_units,
            }) => Some(
                Denial::ThresholdNotMet {
                    amount_needed_minor_units,
                }
                .to_string(),
            ),
            None => None,
        }
    }
}

impl CartEvaluation<'_> {
    /// Builds one offer per product, in the given order. `products` is
    /// expected to be already filtered to sample-eligible products.
    pub fn build_offers(&self, products: &[CatalogProduct]) -> Vec<Offer> {
        products
            .iter()
            .map(|product| {
                let is_in_cart = self.is_sample_in_cart(&product.variant_id);
                let admission = self.evaluate_sample_addition(&product.variant_id);
                let disabled_reason_hint = match admission {
                    SampleAdmission::Denied(Denial::ThresholdNotMet {
                        amount_needed_minor_units,
                    }) => Some(DisabledReasonHint::Threshold {
                        amount_needed_minor_units,
                    }),
                    _ => None,
                };
                Offer {
                    product: product.clone(),
                    is_in_cart,
                    is_disabled: admission != SampleAdmission::Allowed,
                    disabled_reason_hint,
                }
            })
            .collect()
    }
}

pub fn build_offers(
    snapshot: &CartSnapshot,
    policy: &Policy,
    products: &[CatalogProduct],
) -> Vec<Offer> {
    CartPolicyEvaluator::new(*policy)
        .evaluate(snapshot)
        .build_offers(products)
}
