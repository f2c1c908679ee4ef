//! Shipping-address validation and order payload assembly.
//!
//! Validation is entirely client-side and ordered: the first missing or
//! malformed field aborts with its specific message and nothing reaches
//! the network. Only a fully valid form is combined with the normalized
//! checkout cart into an order submission.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tokri_core::UserId;

use crate::api::conversions::CheckoutCart;
use crate::api::types::OrderPayload;

/// Pakistani mobile numbers: `03` followed by nine digits.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^03[0-9]{9}$").expect("mobile pattern compiles"));

/// A checkout form failure, surfaced verbatim to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("First Name is required")]
    FirstNameRequired,

    #[error("Last Name is required")]
    LastNameRequired,

    #[error("Province is required")]
    ProvinceRequired,

    #[error("City is required")]
    CityRequired,

    #[error("Street Address is required")]
    StreetAddressRequired,

    #[error("Please enter a valid mobile number, e.g. 03001234567")]
    InvalidMobile,

    #[error("Email is required")]
    EmailRequired,

    #[error("Your cart is empty")]
    EmptyCart,
}

/// The shipping-address form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub province: String,
    pub city: String,
    pub street_address: String,
    pub mobile: String,
    pub email: String,
}

impl ShippingAddress {
    /// Validate every field in display order, stopping at the first
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the specific [`CheckoutError`] for the first missing or
    /// malformed field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.first_name.trim().is_empty() {
            return Err(CheckoutError::FirstNameRequired);
        }
        if self.last_name.trim().is_empty() {
            return Err(CheckoutError::LastNameRequired);
        }
        if self.province.trim().is_empty() {
            return Err(CheckoutError::ProvinceRequired);
        }
        if self.city.trim().is_empty() {
            return Err(CheckoutError::CityRequired);
        }
        if self.street_address.trim().is_empty() {
            return Err(CheckoutError::StreetAddressRequired);
        }
        if !MOBILE_PATTERN.is_match(self.mobile.trim()) {
            return Err(CheckoutError::InvalidMobile);
        }
        if self.email.trim().is_empty() {
            return Err(CheckoutError::EmailRequired);
        }
        Ok(())
    }
}

/// Combine a validated address with the normalized cart into the order
/// submission payload.
///
/// # Errors
///
/// Returns the address's first validation failure, or
/// [`CheckoutError::EmptyCart`] when there is nothing to order.
pub fn build_order_payload(
    cart: &CheckoutCart,
    address: &ShippingAddress,
    user_id: Option<&UserId>,
) -> Result<OrderPayload, CheckoutError> {
    address.validate()?;

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    Ok(OrderPayload {
        user_id: user_id.cloned(),
        cart_summary: cart.items.clone(),
        total_price: cart.total_price(),
        free_shipping: cart.free_shipping,
        delivery_charges: cart.delivery_charges,
        shipping_address: address.clone(),
    })
}
