//! The cart policy evaluator.
//!
//! One set of rules, shared by the cart transform function, the checkout gate
//! and the sample offer widget. Everything here is pure: an evaluation borrows
//! a snapshot and a policy, derives its values once, and answers questions
//! about them without side effects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::{CartLine, CartSnapshot};
use crate::money::format_currency;
use crate::policy::Policy;
use crate::scalars::ID;

/// Stable admission decision identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionCode {
    Allowed,
    SampleQuantityInvalid,
    ThresholdNotMet,
    SampleLimitExceeded,
}

impl AdmissionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionCode::Allowed => "ALLOWED",
            AdmissionCode::SampleQuantityInvalid => "SAMPLE_QUANTITY_INVALID",
            AdmissionCode::ThresholdNotMet => "THRESHOLD_NOT_MET",
            AdmissionCode::SampleLimitExceeded => "SAMPLE_LIMIT_EXCEEDED",
        }
    }
}

impl fmt::Display for AdmissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking whether a cart may proceed to checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionResult {
    Allowed,
    /// One or more sample lines have a quantity above 1.
    SampleQuantityInvalid { line_ids: Vec<ID> },
    ThresholdNotMet { amount_needed_minor_units: u64 },
    SampleLimitExceeded { sample_count: u64, sample_limit: u64 },
}

impl AdmissionResult {
    pub fn code(&self) -> AdmissionCode {
        match self {
            AdmissionResult::Allowed => AdmissionCode::Allowed,
            AdmissionResult::SampleQuantityInvalid { .. } => AdmissionCode::SampleQuantityInvalid,
            AdmissionResult::ThresholdNotMet { .. } => AdmissionCode::ThresholdNotMet,
            AdmissionResult::SampleLimitExceeded { .. } => AdmissionCode::SampleLimitExceeded,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionResult::Allowed)
    }
}

/// Reason an "add sample" or quantity change is refused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "code")]
pub enum Denial {
    #[serde(rename_all = "camelCase")]
    ThresholdNotMet { amount_needed_minor_units: u64 },
    #[serde(rename_all = "camelCase")]
    SampleLimitReached { sample_limit: u64 },
    AlreadyInCart,
    #[serde(rename_all = "camelCase")]
    SampleQuantityLocked { requested: u64 },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::ThresholdNotMet {
                amount_needed_minor_units,
            } => write!(
                f,
                "Add {} more to unlock",
                format_currency(*amount_needed_minor_units)
            ),
            Denial::SampleLimitReached { sample_limit } => write!(
                f,
                "You can only add {sample_limit} free sample(s) to your order."
            ),
            Denial::AlreadyInCart => f.write_str("This free sample is already in your cart."),
            Denial::SampleQuantityLocked { .. } => {
                f.write_str("Free sample quantity cannot be changed")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleAdmission {
    Allowed,
    Denied(Denial),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuantityAdmission {
    Allowed,
    Denied(Denial),
    UnknownLine,
}

/// Line-level price override. Sample lines are always forced to zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAdjustment {
    pub line_id: ID,
    pub new_unit_price_minor_units: u64,
}

/// One zero-price adjustment per sample line, in line order. Lines that are
/// not samples get nothing.
pub fn price_adjustments_for(snapshot: &CartSnapshot) -> Vec<PriceAdjustment> {
    snapshot
        .sample_lines()
        .map(|line| PriceAdjustment {
            line_id: line.line_id.clone(),
            new_unit_price_minor_units: 0,
        })
        .collect()
}

/// Evaluator bound to a merchant policy. Cheap to copy and safe to share
/// between threads.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CartPolicyEvaluator {
    policy: Policy,
}

impl CartPolicyEvaluator {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn evaluate<'a>(&'a self, snapshot: &'a CartSnapshot) -> CartEvaluation<'a> {
        let threshold_minor_units = self.policy.threshold_minor_units();
        let sample_count = snapshot
            .sample_lines()
            .map(|line| line.quantity)
            .fold(0u64, u64::saturating_add);
        CartEvaluation {
            snapshot,
            policy: &self.policy,
            threshold_minor_units,
            sample_count,
        }
    }
}

/// Values derived from one snapshot under one policy.
#[derive(Clone, Debug)]
pub struct CartEvaluation<'a> {
    snapshot: &'a CartSnapshot,
    policy: &'a Policy,
    threshold_minor_units: u64,
    sample_count: u64,
}

impl<'a> CartEvaluation<'a> {
    pub fn snapshot(&self) -> &'a CartSnapshot {
        self.snapshot
    }

    pub fn policy(&self) -> &'a Policy {
        self.policy
    }

    pub fn sample_lines(&self) -> impl Iterator<Item = &'a CartLine> {
        self.snapshot.sample_lines()
    }

    /// Total sample units across the cart.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn threshold_met(&self) -> bool {
        self.snapshot.subtotal_minor_units >= self.threshold_minor_units
    }

    pub fn within_limit(&self) -> bool {
        self.sample_count <= self.policy.sample_limit()
    }

    pub fn over_quantity_samples(&self) -> impl Iterator<Item = &'a CartLine> {
        self.sample_lines().filter(|line| line.quantity > 1)
    }

    /// How much more the cart must spend to meet the threshold; zero once met.
    pub fn amount_needed_minor_units(&self) -> u64 {
        self.threshold_minor_units
            .saturating_sub(self.snapshot.subtotal_minor_units)
    }

    /// Checks, in order: sample quantities, threshold, sample limit. The first
    /// failing check decides.
    pub fn evaluate_checkout_admission(&self) -> AdmissionResult {
        let line_ids: Vec<ID> = self
            .over_quantity_samples()
            .map(|line| line.line_id.clone())
            .collect();
        if !line_ids.is_empty() {
            return AdmissionResult::SampleQuantityInvalid { line_ids };
        }
        if !self.threshold_met() {
            return AdmissionResult::ThresholdNotMet {
                amount_needed_minor_units: self.amount_needed_minor_units(),
            };
        }
        if !self.within_limit() {
            return AdmissionResult::SampleLimitExceeded {
                sample_count: self.sample_count,
                sample_limit: self.policy.sample_limit(),
            };
        }
        AdmissionResult::Allowed
    }

    pub fn price_adjustments(&self) -> Vec<PriceAdjustment> {
        price_adjustments_for(self.snapshot)
    }

    /// Whether the default variant is already in the cart as a sample line.
    pub fn is_sample_in_cart(&self, variant_id: &str) -> bool {
        self.sample_lines()
            .any(|line| line.variant_id == variant_id && line.quantity >= 1)
    }

    /// Decides whether one unit of `variant_id` may be added as a sample.
    pub fn evaluate_sample_addition(&self, variant_id: &str) -> SampleAdmission {
        if !self.threshold_met() {
            return SampleAdmission::Denied(Denial::ThresholdNotMet {
                amount_needed_minor_units: self.amount_needed_minor_units(),
            });
        }
        if self.sample_count >= self.policy.sample_limit() {
            return SampleAdmission::Denied(Denial::SampleLimitReached {
                sample_limit: self.policy.sample_limit(),
            });
        }
        if self.is_sample_in_cart(variant_id) {
            return SampleAdmission::Denied(Denial::AlreadyInCart);
        }
        SampleAdmission::Allowed
    }

    /// Decides whether a line may be set to `quantity`. Sample lines only
    /// accept 0 (removal) or 1.
    pub fn evaluate_quantity_change(&self, line_id: &str, quantity: u64) -> QuantityAdmission {
        let Some(line) = self.snapshot.line(line_id) else {
            return QuantityAdmission::UnknownLine;
        };
        if line.is_sample() && quantity > 1 {
            return QuantityAdmission::Denied(Denial::SampleQuantityLocked {
                requested: quantity,
            });
        }
        QuantityAdmission::Allowed
    }
}
