//! Cart management commands.
//!
//! # Usage
//!
//! ```bash
//! tokri cart add --product p1 --count 2 --variant Finish=Brushed
//! tokri cart show
//! tokri cart update "p1|Finish:Brushed" 3
//! tokri cart remove "p1|Finish:Brushed"
//! tokri cart remove-variant p1 Brushed
//! tokri cart clear
//! ```

use thiserror::Error;
use tracing::info;

use tokri_core::{CartItemId, ProductId};
use tokri_engine::error::EngineError;
use tokri_engine::pricing::Selection;
use tokri_engine::Storefront;

/// Errors that can occur in cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// A --variant flag was not NAME=VALUE.
    #[error("Invalid --variant '{0}', expected NAME=VALUE")]
    InvalidVariant(String),

    /// The engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Build a [`Selection`] from repeated `NAME=VALUE` flags and a tier index.
fn parse_selection(
    variants: &[String],
    tier: Option<usize>,
) -> Result<Selection, CartCommandError> {
    let mut selection = Selection::default();
    for raw in variants {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| CartCommandError::InvalidVariant(raw.clone()))?;
        selection = selection.with_variant(name.trim(), value.trim());
    }
    if let Some(index) = tier {
        selection = selection.with_tier(index);
    }
    Ok(selection)
}

/// Resolve a configuration and add it to the cart.
pub async fn add(
    engine: &Storefront,
    product_id: &ProductId,
    count: u32,
    variants: &[String],
    tier: Option<usize>,
) -> Result<(), CartCommandError> {
    let selection = parse_selection(variants, tier)?;
    let item = engine.add_to_cart(product_id, &selection, count).await?;

    info!(
        cart_item_id = %item.cart_item_id,
        unit_price = %item.price,
        count = item.count,
        "Added to cart"
    );
    show(engine);
    Ok(())
}

/// Print the cart with its derived totals.
#[allow(clippy::print_stdout)]
pub fn show(engine: &Storefront) {
    let state = engine.cart().snapshot();

    if state.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in &state.products {
        let variants = item
            .selected_variants
            .iter()
            .map(|v| format!("{}: {}", v.name, v.values.join("/")))
            .collect::<Vec<_>>()
            .join(", ");

        println!(
            "{:<30} {:>3} x {:>10}  {}  [{}]",
            item.title,
            item.count,
            item.price,
            if variants.is_empty() {
                String::new()
            } else {
                format!("({variants})")
            },
            item.cart_item_id,
        );
    }

    println!("{} items", state.total_items());
    println!("Subtotal:  {}", state.cart_total);
    println!(
        "Delivery:  {}",
        if state.free_shipping {
            "free".to_string()
        } else {
            state.delivery_charges.to_string()
        }
    );
    println!("Total:     {}", state.cart_total + state.delivery_charges);
}

/// Set the quantity of a cart line.
pub fn update(engine: &Storefront, cart_item_id: &CartItemId, count: u32) {
    engine.cart().update_quantity(cart_item_id, count.max(1));
    show(engine);
}

/// Remove a cart line.
pub fn remove(engine: &Storefront, cart_item_id: &CartItemId) {
    engine.cart().remove_item(cart_item_id);
    show(engine);
}

/// Remove a chosen variant value from a product's lines.
pub fn remove_variant(engine: &Storefront, product_id: &ProductId, value: &str) {
    engine.cart().remove_variant_value(product_id, value);
    show(engine);
}

/// Empty the cart.
pub fn clear(engine: &Storefront) {
    engine.cart().clear();
    info!("Cart cleared");
}
