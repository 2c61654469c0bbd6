//! Output schema of the cart transform function and the mapping from price
//! adjustments to host operations.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::evaluator::PriceAdjustment;
use crate::money::format_minor_units;
use crate::scalars::ID;

#[derive(Clone, Debug, Serialize, PartialEq, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "camelCase"))]
pub struct FunctionRunResult {
    pub operations: Vec<Operation>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "camelCase"))]
pub enum Operation {
    LineUpdate(LineUpdateOperation),
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, PartialEq, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "camelCase"))]
pub struct LineUpdateOperation {
    pub cart_line_id: ID,
    pub price: Option<LineUpdatePrice>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Deserialize)]
pub struct LineUpdatePrice {
    pub adjustment: PriceAdjustmentValue,
}

#[derive(Clone, Debug, Serialize, PartialEq, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "camelCase"))]
pub enum PriceAdjustmentValue {
    FixedPricePerUnit(FixedPricePerUnit),
}

/// A fixed per-unit price, as a major-unit decimal string such as `"0.00"`.
#[derive(Clone, Debug, Serialize, PartialEq, Deserialize)]
pub struct FixedPricePerUnit {
    pub amount: String,
}

pub static NO_CHANGES: FunctionRunResult = FunctionRunResult {
    operations: vec![],
};

impl From<PriceAdjustment> for Operation {
    fn from(adjustment: PriceAdjustment) -> Self {
        Operation::LineUpdate(LineUpdateOperation {
            cart_line_id: adjustment.line_id,
            price: Some(LineUpdatePrice {
                adjustment: PriceAdjustmentValue::FixedPricePerUnit(FixedPricePerUnit {
                    amount: format_minor_units(adjustment.new_unit_price_minor_units),
                }),
            }),
            title: None,
        })
    }
}

/// What the cart transform hands back to the host. `NoChanges` lets the host
/// skip the update step entirely.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformOutcome {
    NoChanges,
    Apply(Vec<Operation>),
}

impl TransformOutcome {
    pub fn from_adjustments(adjustments: Vec<PriceAdjustment>) -> Self {
        if adjustments.is_empty() {
            return TransformOutcome::NoChanges;
        }
        TransformOutcome::Apply(adjustments.into_iter().map(Operation::from).collect())
    }

    pub fn operation_count(&self) -> usize {
        match self {
            TransformOutcome::NoChanges => 0,
            TransformOutcome::Apply(operations) => operations.len(),
        }
    }
}

impl From<TransformOutcome> for FunctionRunResult {
    fn from(outcome: TransformOutcome) -> Self {
        match outcome {
            TransformOutcome::NoChanges => NO_CHANGES.clone(),
            TransformOutcome::Apply(operations) => FunctionRunResult { operations },
        }
    }
}
