//! Cart policy for "free sample" promotions on Shopify stores.
//!
//! Merchants tag products with `free-sample`, configure a spending threshold
//! and a per-order sample limit, and every surface that touches the cart
//! (the cart transform function, the checkout gate, the sample offer widget)
//! asks the same [`evaluator::CartPolicyEvaluator`] for its decisions.
//!
//! ```ignore
//! use free_sample::prelude::*;
//!
//! #[shopify_function]
//! fn run(input: input::Input) -> Result<FunctionRunResult> {
//!     let snapshot = input.cart.into_snapshot();
//!     Ok(TransformOutcome::from_adjustments(price_adjustments_for(&snapshot)).into())
//! }
//! ```

pub use free_sample_macro::shopify_function;
pub use serde;
pub use serde_json;

pub mod cart;
pub mod cart_transform;
pub mod catalog;
pub mod checkout;
pub mod evaluator;
pub mod money;
pub mod offers;
pub mod policy;
pub mod scalars;

pub mod prelude {
    pub use crate::cart::{CartLine, CartSnapshot};
    pub use crate::cart_transform::{FunctionRunResult, TransformOutcome};
    pub use crate::evaluator::{price_adjustments_for, CartPolicyEvaluator};
    pub use crate::log;
    pub use crate::policy::Policy;
    pub use crate::scalars::*;
    pub use crate::Result;
    pub use free_sample_macro::shopify_function;
}

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Decodes a JSON configuration blob, falling back to `T::default()` when the
/// blob is missing or cannot be decoded.
pub fn parse_config<'a, T: Default + serde::Deserialize<'a>>(config: Option<&'a str>) -> T {
    config
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// Runs the given function `f` with the invocation payload, returning the
/// deserialized output. This function is provided as a helper when writing
/// tests.
pub fn run_function_with_input<F, P, O>(f: F, payload: &str) -> Result<O>
where
    F: Fn(P) -> Result<O>,
    P: serde::de::DeserializeOwned,
{
    let input: P = serde_json::from_str(payload)?;
    f(input)
}

#[doc(hidden)]
pub fn write_log(message: &str) {
    use std::io::Write;
    // Function logs are best effort; a closed stderr must not fail the run.
    let _ = std::io::stderr().write_all(message.as_bytes());
}

#[macro_export]
macro_rules! log {
    ($($args:tt)*) => {
        {
            use std::fmt::Write;
            let mut buf = String::new();
            writeln!(&mut buf, $($args)*).unwrap();
            $crate::write_log(&buf);
        }
    };
}
