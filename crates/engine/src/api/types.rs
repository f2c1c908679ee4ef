//! Domain types for the storefront backend API.
//!
//! These mirror the backend's JSON wire shapes (camelCase fields, Mongo
//! style `_id` keys) while staying ergonomic on the Rust side. Money
//! fields are [`Price`] and travel as bare JSON numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tokri_core::{OrderId, Price, ProductId, UserId};

use crate::checkout::ShippingAddress;

// =============================================================================
// Product Types
// =============================================================================

/// A named variant choice attached to a cart line (e.g. Color: Red, Blue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedVariant {
    /// Variant name (e.g. "Color").
    pub name: String,
    /// Chosen values for that variant.
    pub values: Vec<String>,
}

/// One selectable value of a product variant.
///
/// A value may carry its own price and image override; when any selected
/// value does, the overrides replace the product's base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantValue {
    /// The value label (e.g. "Red").
    pub value: String,
    /// Price override for this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Image override for this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A named product option with its selectable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Option name (e.g. "Color", "Size").
    pub name: String,
    /// Selectable values.
    pub values: Vec<VariantValue>,
}

/// A bundle offer: buy `quantity` units at `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTier {
    /// Number of units the tier covers.
    pub quantity: u32,
    /// Bundle price for the whole tier.
    pub price: Price,
    /// Representative image for the tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A product as served by the catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Product id.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Base unit price.
    pub price: Price,
    /// Sale price; overrides the base price when present and non-zero.
    #[serde(default)]
    pub sale_price: Option<Price>,
    /// Whether a deal-of-the-day is configured.
    #[serde(default)]
    pub is_dod: bool,
    /// Deal-of-the-day price.
    #[serde(default)]
    pub dod_price: Option<Price>,
    /// Deal-of-the-day expiry; an absent expiry never lapses.
    #[serde(default)]
    pub dod_end: Option<DateTime<Utc>>,
    /// Units in stock at fetch time.
    #[serde(default)]
    pub stock: Option<u32>,
    /// Whether the product ships free.
    #[serde(default)]
    pub free_shipping: bool,
    /// Variant options, empty for single-configuration products.
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Whether volume tiers are offered.
    #[serde(default)]
    pub volume_tier_enabled: bool,
    /// Available volume tiers.
    #[serde(default)]
    pub volume_tiers: Vec<VolumeTier>,
}

impl ProductRecord {
    /// The active deal-of-the-day price, if the deal is on and unexpired.
    #[must_use]
    pub fn active_deal(&self, now: DateTime<Utc>) -> Option<Price> {
        if !self.is_dod {
            return None;
        }
        if self.dod_end.is_some_and(|end| end <= now) {
            return None;
        }
        self.dod_price
    }
}

// =============================================================================
// Cart Wire Types
// =============================================================================

/// One line of a cart as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinePayload {
    /// Product id.
    pub product_id: ProductId,
    /// Display title snapshot.
    pub title: String,
    /// Quantity.
    pub count: u32,
    /// Unit price snapshot.
    pub price: Price,
    /// Image snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Variant choices that produced this line.
    #[serde(default)]
    pub selected_variants: Vec<SelectedVariant>,
}

/// The minimal cart shape the backend accepts on push.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    /// Cart lines.
    pub products: Vec<CartLinePayload>,
    /// Cart-level delivery charge.
    pub delivery_charges: Price,
}

/// Body of the cart push endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushCartRequest {
    /// Cart owner (user id, or guest marker id).
    pub user_id: UserId,
    /// The cart snapshot.
    pub cart: CartPayload,
}

/// Body of the guest-cart merge endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCartRequest {
    /// The now-identified user the guest cart folds into.
    pub user_id: UserId,
}

/// A product reference nested inside a server-held cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProduct {
    /// Product id.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Server-held title.
    pub title: String,
    /// Server-held unit price.
    pub price: Price,
    /// Server-held image.
    #[serde(default)]
    pub image: Option<String>,
    /// Whether the product ships free.
    #[serde(default)]
    pub free_shipping: bool,
}

/// One line of the server-held cart (authenticated shape).
///
/// The backend nests a full product reference inside each line; the
/// normalizer flattens it, preferring server-held fields over any client
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCartLine {
    /// Nested product reference; absent when the product was deleted.
    #[serde(default)]
    pub product: Option<ServerProduct>,
    /// Quantity.
    pub count: u32,
    /// Variant choices.
    #[serde(default)]
    pub selected_variants: Vec<SelectedVariant>,
}

/// The server-held cart record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCart {
    /// Cart lines.
    #[serde(default)]
    pub products: Vec<ServerCartLine>,
    /// Cart-level delivery charge, when the server recorded one.
    #[serde(default)]
    pub delivery_charges: Option<Price>,
}

// =============================================================================
// Order Wire Types
// =============================================================================

/// The order submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Cart owner, absent for guest orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Snapshot of every cart line.
    pub cart_summary: Vec<CartLinePayload>,
    /// Item total plus delivery charges.
    pub total_price: Price,
    /// Whether the whole order ships free.
    pub free_shipping: bool,
    /// Cart-level delivery charge.
    pub delivery_charges: Price,
    /// Where to ship.
    pub shipping_address: ShippingAddress,
}

/// The order reference returned on successful placement.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacedOrder {
    /// New order id, for the order-history handoff.
    #[serde(rename = "_id")]
    pub id: OrderId,
}

/// Successful order placement response.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: PlacedOrder,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body the backend returns on failed calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
