//! The cart store: line items and their derived totals.
//!
//! The store is the single holder of cart state. Every mutation runs
//! synchronously to completion, recomputes the derived aggregates from
//! scratch, persists the result, and publishes a snapshot to observers.
//! Two line items never share a `cart_item_id`; adding a duplicate
//! merges counts instead.

pub mod storage;

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use tokri_core::{CartItemId, Price, ProductId};

use crate::api::types::{SelectedVariant, VolumeTier};
use storage::{CartStorage, PersistedCart};

/// Cart-level flat delivery fee, charged once regardless of item count.
#[must_use]
pub fn flat_delivery_fee() -> Price {
    Price::rupees(200)
}

/// Per-item delivery charge snapshot for products that don't ship free.
#[must_use]
pub fn item_delivery_charge(free_shipping: bool) -> Price {
    if free_shipping {
        Price::zero()
    } else {
        Price::rupees(250)
    }
}

/// Key for one product+variant-selection combination.
///
/// A bare product id, or `productId|name:value` per individually chosen
/// variant value.
#[must_use]
pub fn derive_cart_item_id(product_id: &ProductId, variants: &[SelectedVariant]) -> CartItemId {
    let mut key = product_id.as_str().to_string();
    for group in variants {
        for value in &group.values {
            key.push('|');
            key.push_str(&group.name);
            key.push(':');
            key.push_str(value);
        }
    }
    CartItemId::new(key)
}

// =============================================================================
// Line Items
// =============================================================================

/// One purchasable entry in the cart.
///
/// Title, image, and price are display snapshots copied at add time;
/// they are not re-synced if the product changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Unique key for this product+variant-selection combination.
    pub cart_item_id: CartItemId,
    /// The product this line snapshots.
    pub product_id: ProductId,
    /// Display title snapshot.
    pub title: String,
    /// Image snapshot.
    #[serde(default)]
    pub image: Option<String>,
    /// Unit price resolved at add time (variant/tier/deal already
    /// applied).
    pub price: Price,
    /// Quantity, at least 1 at add time.
    pub count: u32,
    /// The variant choices that produced this price and image.
    #[serde(default)]
    pub selected_variants: Vec<SelectedVariant>,
    /// Whether this item ships free.
    #[serde(default)]
    pub free_shipping: bool,
    /// Per-item delivery charge snapshot.
    #[serde(default)]
    pub delivery_charges: Price,
    /// Snapshot of the chosen volume tier, for audit/display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_tier: Option<VolumeTier>,
}

impl LineItem {
    /// This line's contribution to the cart total.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.count)
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// The aggregate cart: line items plus derived totals.
///
/// `cart_total` always equals the sum of `price * count` over
/// `products`; it is recomputed, never independently mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    /// Line items, insertion order preserved for display.
    pub products: Vec<LineItem>,
    /// Sum of `price * count` over all items.
    pub cart_total: Price,
    /// True iff the cart is non-empty and every item ships free.
    pub free_shipping: bool,
    /// Cart-level flat delivery fee; zero when shipping is free.
    pub delivery_charges: Price,
}

impl CartState {
    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Total unit count across all lines, for the cart badge.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.products.iter().map(|i| i.count).sum()
    }

    fn recompute(&mut self) {
        let aggregates = recompute_aggregates(&self.products);
        self.cart_total = aggregates.cart_total;
        self.free_shipping = aggregates.free_shipping;
        self.delivery_charges = aggregates.delivery_charges;
    }

    fn from_persisted(persisted: PersistedCart) -> Self {
        let mut state = Self {
            products: persisted.cartproducts,
            ..Self::default()
        };
        state.recompute();
        if state.cart_total != persisted.cart_total {
            warn!(
                recorded = %persisted.cart_total,
                recomputed = %state.cart_total,
                "Persisted cart total disagreed with its items; using the recomputed value"
            );
        }
        state
    }
}

/// Derived totals over a set of line items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    /// Sum of `price * count`.
    pub cart_total: Price,
    /// Non-empty and every item ships free.
    pub free_shipping: bool,
    /// Flat fee when any item needs delivery, zero otherwise.
    pub delivery_charges: Price,
}

/// Recompute every derived field from the line items alone.
///
/// All four mutators funnel through this one function, so no operation
/// can leave `cart_total` inconsistent with its items.
#[must_use]
pub fn recompute_aggregates(items: &[LineItem]) -> Aggregates {
    let cart_total = items.iter().map(LineItem::line_total).sum();
    let free_shipping = !items.is_empty() && items.iter().all(|i| i.free_shipping);
    let delivery_charges = if free_shipping || items.is_empty() {
        Price::zero()
    } else {
        flat_delivery_fee()
    };

    Aggregates {
        cart_total,
        free_shipping,
        delivery_charges,
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// The owning container for cart state.
///
/// Mutations take `&self` and serialize internally; consumers observe
/// changes either by polling [`CartStore::snapshot`] or by subscribing
/// to the watch channel.
pub struct CartStore {
    state: RwLock<CartState>,
    storage: Box<dyn CartStorage>,
    updates: watch::Sender<CartState>,
}

impl CartStore {
    /// Create a store hydrated from the given storage backend.
    ///
    /// A missing or unreadable persisted cart degrades to an empty cart;
    /// storage never blocks the store from starting.
    #[must_use]
    pub fn new(storage: Box<dyn CartStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(persisted)) => CartState::from_persisted(persisted),
            Ok(None) => CartState::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart, starting empty");
                CartState::default()
            }
        };

        let (updates, _) = watch::channel(state.clone());

        Self {
            state: RwLock::new(state),
            storage,
            updates,
        }
    }

    /// A point-in-time copy of the cart.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to cart snapshots; the receiver sees every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.updates.subscribe()
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, CartState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one mutation over the items, then recompute, persist, notify.
    fn mutate(&self, op: impl FnOnce(&mut Vec<LineItem>)) {
        let snapshot = {
            let mut state = self.write_lock();
            op(&mut state.products);
            state.recompute();
            state.clone()
        };

        self.persist(&snapshot);
        self.updates.send_replace(snapshot);
    }

    fn persist(&self, state: &CartState) {
        let persisted = PersistedCart {
            cartproducts: state.products.clone(),
            cart_total: state.cart_total,
        };
        if let Err(e) = self.storage.save(&persisted) {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    /// Add a line item, merging counts when the key already exists.
    pub fn add_item(&self, item: LineItem) {
        self.mutate(|items| {
            match items
                .iter_mut()
                .find(|existing| existing.cart_item_id == item.cart_item_id)
            {
                Some(existing) => existing.count += item.count,
                None => items.push(item),
            }
        });
    }

    /// Set the quantity of the line with the given key.
    ///
    /// The count is taken as given: callers disallow decrementing below 1
    /// or incrementing past stock. A stale key is a silent no-op.
    pub fn update_quantity(&self, cart_item_id: &CartItemId, new_count: u32) {
        self.mutate(|items| {
            match items.iter_mut().find(|i| &i.cart_item_id == cart_item_id) {
                Some(item) => item.count = new_count,
                None => debug!(%cart_item_id, "update_quantity on a stale cart item id"),
            }
        });
    }

    /// Remove the line with the given key. A stale key is a silent no-op.
    pub fn remove_item(&self, cart_item_id: &CartItemId) {
        self.mutate(|items| {
            items.retain(|i| &i.cart_item_id != cart_item_id);
        });
    }

    /// Remove a chosen variant value from every line of a product,
    /// dropping a variant group once it has no values left.
    pub fn remove_variant_value(&self, product_id: &ProductId, value: &str) {
        self.mutate(|items| {
            for item in items.iter_mut().filter(|i| &i.product_id == product_id) {
                for group in &mut item.selected_variants {
                    group.values.retain(|v| v != value);
                }
                item.selected_variants.retain(|g| !g.values.is_empty());
            }
        });
    }

    /// Empty the cart and erase the persisted copy.
    pub fn clear(&self) {
        let snapshot = {
            let mut state = self.write_lock();
            *state = CartState::default();
            state.clone()
        };

        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to erase persisted cart");
        }
        self.updates.send_replace(snapshot);
    }
}
