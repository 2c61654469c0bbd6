//! Checkout gate: turns an admission result into "proceed" or a message.

use serde::{Deserialize, Serialize};

use crate::cart::CartSnapshot;
use crate::evaluator::{AdmissionCode, AdmissionResult, CartPolicyEvaluator};
use crate::money::format_currency;
use crate::policy::Policy;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "decision")]
pub enum GateDecision {
    Proceed,
    Blocked { code: AdmissionCode, message: String },
}

impl GateDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateDecision::Proceed)
    }
}

impl AdmissionResult {
    /// The user-facing message for a denial, or `None` when checkout is allowed.
    pub fn message(&self) -> Option<String> {
        match self {
            AdmissionResult::Allowed => None,
            AdmissionResult::SampleQuantityInvalid { .. } => Some(
                "Free samples cannot have quantity more than 1. Please fix quantities.".to_string(),
            ),
            AdmissionResult::ThresholdNotMet {
                amount_needed_minor_units,
            } => Some(format!(
                "Add {} more to qualify for free samples.",
                format_currency(*amount_needed_minor_units)
            )),
            AdmissionResult::SampleLimitExceeded { sample_limit, .. } => Some(format!(
                "You can only add {sample_limit} free sample(s) to your order."
            )),
        }
    }
}

impl From<AdmissionResult> for GateDecision {
    fn from(result: AdmissionResult) -> Self {
        match result.message() {
            None => GateDecision::Proceed,
            Some(message) => GateDecision::Blocked {
                code: result.code(),
                message,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CheckoutGate {
    evaluator: CartPolicyEvaluator,
}

impl CheckoutGate {
    pub fn new(policy: Policy) -> Self {
        Self {
            evaluator: CartPolicyEvaluator::new(policy),
        }
    }

    /// Decides against a freshly fetched snapshot. The caller navigates to
    /// checkout only on [`GateDecision::Proceed`].
    pub fn decide(&self, snapshot: &CartSnapshot) -> GateDecision {
        self.evaluator
            .evaluate(snapshot)
            .evaluate_checkout_admission()
            .into()
    }
}
