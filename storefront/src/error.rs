//! Error types for storefront cart sessions.

use free_sample::evaluator::Denial;
use thiserror::Error;

/// Failure reported by a [`crate::CartBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// The endpoint could not be reached.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Errors returned by [`crate::CartSession`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading the cart or catalog failed. Published state is unchanged.
    #[error("failed to load cart state: {0}")]
    Fetch(#[source] BackendError),

    /// A cart mutation failed mid-flight. It must not be treated as applied.
    #[error("cart update failed: {0}")]
    Mutation(#[source] BackendError),

    /// A request exceeded the session's request timeout.
    #[error("{operation} timed out")]
    Timeout {
        /// The request that timed out.
        operation: &'static str,
    },

    /// The session was cancelled before the request completed.
    #[error("cart session cancelled")]
    Cancelled,

    /// The promotion policy refused the change.
    #[error("{0}")]
    Denied(Denial),

    #[error("no cart line with id {0}")]
    UnknownLine(String),

    #[error("product {0} is not offered as a free sample")]
    UnknownProduct(String),
}

/// Result type alias for cart session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
