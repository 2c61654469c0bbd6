//! Storefront side of the free sample promotion.
//!
//! [`CartSession`] keeps one source-of-truth view of the cart and its sample
//! offers, serializes cart mutations, and re-validates every change with the
//! shared [`free_sample`] evaluator before it reaches the cart.

pub mod backend;
pub mod error;
pub mod session;
pub mod wire;

pub use backend::{AjaxBackend, CartBackend};
pub use error::{BackendError, Result, SessionError};
pub use session::{CartSession, CartView, SessionConfig, DEFAULT_REQUEST_TIMEOUT};
