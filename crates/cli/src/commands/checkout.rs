//! Checkout command.
//!
//! Reconciles the cart with the backend, validates the shipping address,
//! and places the order. Validation failures print their shopper-facing
//! message and nothing reaches the order endpoint.

use tracing::info;

use tokri_engine::error::EngineError;
use tokri_engine::{ShippingAddress, Storefront};

/// Enter checkout and place the order.
#[allow(clippy::print_stdout)]
pub async fn place(engine: &Storefront, address: &ShippingAddress) -> Result<(), EngineError> {
    // Validate before any network traffic so form errors are instant.
    address.validate().map_err(EngineError::from)?;

    let cart = engine.enter_checkout().await?;
    info!(
        items = cart.items.len(),
        subtotal = %cart.subtotal,
        "Entering checkout"
    );

    let order_id = engine.place_order(&cart, address).await?;

    println!("Order placed: {order_id}");
    println!("Total charged: {}", cart.total_price());
    Ok(())
}
