//! Unified engine error type.
//!
//! Every fallible engine flow returns [`EngineError`]. Failures never
//! crash the embedding UI: callers surface [`EngineError::user_message`]
//! as a toast and keep the cart/form state for retry.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::storage::StorageError;
use crate::checkout::CheckoutError;
use crate::pricing::PricingError;

/// Application-level error type for the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable cart storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The configuration cannot be added to the cart.
    #[error("{0}")]
    Pricing(#[from] PricingError),

    /// The checkout form or cart failed validation.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
}

impl EngineError {
    /// The message to surface to a shopper.
    ///
    /// Validation errors show their specific message; everything else
    /// degrades to the server-supplied message or a generic fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Pricing(e) => e.to_string(),
            Self::Checkout(e) => e.to_string(),
            Self::Storage(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}
