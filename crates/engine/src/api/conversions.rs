//! Cart shape normalization.
//!
//! Two cart shapes reach checkout: the locally held store state (guest
//! flow) and the server-held record with nested product references
//! (authenticated flow). Both collapse into one [`CheckoutCart`] through
//! an exhaustive match - no speculative field fallbacks. Server-held
//! price, title, and image always win over client snapshots.

use tracing::warn;

use tokri_core::Price;

use crate::cart::{self, CartState, LineItem};

use super::types::{CartLinePayload, CartPayload, ServerCart};

/// Which side currently holds the cart being normalized.
#[derive(Debug, Clone)]
pub enum CartSource {
    /// The client-held store state.
    Local(CartState),
    /// The server-held cart record.
    Server(ServerCart),
}

/// The canonical cart shape checkout works from.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutCart {
    /// Flattened lines.
    pub items: Vec<CartLinePayload>,
    /// Sum of `price * count`.
    pub subtotal: Price,
    /// Whether the whole cart ships free.
    pub free_shipping: bool,
    /// Cart-level delivery charge.
    pub delivery_charges: Price,
}

impl CheckoutCart {
    /// Whether there is anything to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Subtotal plus delivery charges.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.subtotal + self.delivery_charges
    }
}

/// Collapse either cart shape into the canonical checkout view.
#[must_use]
pub fn normalize(source: CartSource) -> CheckoutCart {
    match source {
        CartSource::Local(state) => CheckoutCart {
            items: state.products.iter().map(to_line_payload).collect(),
            subtotal: state.cart_total,
            free_shipping: state.free_shipping,
            delivery_charges: state.delivery_charges,
        },
        CartSource::Server(server) => {
            let mut items = Vec::new();
            let mut all_free = true;
            for line in server.products {
                // A deleted product leaves a dangling line; skip it rather
                // than show a hole at checkout.
                let Some(product) = line.product else {
                    warn!("Server cart line without a product reference, skipping");
                    continue;
                };
                all_free &= product.free_shipping;
                items.push(CartLinePayload {
                    product_id: product.id,
                    title: product.title,
                    count: line.count,
                    price: product.price,
                    image: product.image,
                    selected_variants: line.selected_variants,
                });
            }

            let subtotal = items.iter().map(|i| i.price.times(i.count)).sum();
            let free_shipping = !items.is_empty() && all_free;
            let delivery_charges = if free_shipping || items.is_empty() {
                Price::zero()
            } else {
                server
                    .delivery_charges
                    .unwrap_or_else(cart::flat_delivery_fee)
            };

            CheckoutCart {
                items,
                subtotal,
                free_shipping,
                delivery_charges,
            }
        }
    }
}

/// The minimal wire shape of one store line.
#[must_use]
pub fn to_line_payload(item: &LineItem) -> CartLinePayload {
    CartLinePayload {
        product_id: item.product_id.clone(),
        title: item.title.clone(),
        count: item.count,
        price: item.price,
        image: item.image.clone(),
        selected_variants: item.selected_variants.clone(),
    }
}

/// The cart snapshot shape the push endpoint accepts.
#[must_use]
pub fn to_cart_payload(state: &CartState) -> CartPayload {
    CartPayload {
        products: state.products.iter().map(to_line_payload).collect(),
        delivery_charges: state.delivery_charges,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokri_core::{CartItemId, ProductId};

    use crate::api::types::{SelectedVariant, ServerCartLine, ServerProduct};

    fn store_item(id: &str, price: i64, count: u32, free_shipping: bool) -> LineItem {
        LineItem {
            cart_item_id: CartItemId::new(id),
            product_id: ProductId::new(id),
            title: format!("Item {id}"),
            image: Some(format!("{id}.jpg")),
            price: Price::rupees(price),
            count,
            selected_variants: Vec::new(),
            free_shipping,
            delivery_charges: cart::item_delivery_charge(free_shipping),
            selected_tier: None,
        }
    }

    #[test]
    fn test_normalize_local_passes_store_aggregates_through() {
        let mut state = CartState::default();
        state.products = vec![store_item("P1", 100, 2, false)];
        state.cart_total = Price::rupees(200);
        state.delivery_charges = cart::flat_delivery_fee();

        let cart = normalize(CartSource::Local(state));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.subtotal, Price::rupees(200));
        assert_eq!(cart.total_price(), Price::rupees(400));
        assert!(!cart.free_shipping);
    }

    fn server_line(id: &str, price: i64, count: u32, free_shipping: bool) -> ServerCartLine {
        ServerCartLine {
            product: Some(ServerProduct {
                id: ProductId::new(id),
                title: format!("Server {id}"),
                price: Price::rupees(price),
                image: Some(format!("server-{id}.jpg")),
                free_shipping,
            }),
            count,
            selected_variants: vec![SelectedVariant {
                name: "Color".to_string(),
                values: vec!["Red".to_string()],
            }],
        }
    }

    #[test]
    fn test_normalize_server_flattens_nested_products() {
        let server = ServerCart {
            products: vec![server_line("P1", 150, 2, false)],
            delivery_charges: Some(Price::rupees(200)),
        };

        let cart = normalize(CartSource::Server(server));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].title, "Server P1");
        assert_eq!(cart.items[0].price, Price::rupees(150));
        assert_eq!(cart.items[0].image.as_deref(), Some("server-P1.jpg"));
        assert_eq!(cart.subtotal, Price::rupees(300));
        assert_eq!(cart.delivery_charges, Price::rupees(200));
    }

    #[test]
    fn test_normalize_server_skips_dangling_lines() {
        let server = ServerCart {
            products: vec![
                ServerCartLine {
                    product: None,
                    count: 1,
                    selected_variants: Vec::new(),
                },
                server_line("P2", 50, 1, true),
            ],
            delivery_charges: None,
        };

        let cart = normalize(CartSource::Server(server));
        assert_eq!(cart.items.len(), 1);
        assert!(cart.free_shipping);
        assert_eq!(cart.delivery_charges, Price::zero());
    }

    #[test]
    fn test_normalize_server_falls_back_to_flat_fee() {
        let server = ServerCart {
            products: vec![server_line("P1", 100, 1, false)],
            delivery_charges: None,
        };

        let cart = normalize(CartSource::Server(server));
        assert_eq!(cart.delivery_charges, cart::flat_delivery_fee());
    }

    #[test]
    fn test_to_cart_payload_minimal_shape() {
        let mut state = CartState::default();
        state.products = vec![store_item("P1", 100, 2, false)];
        state.delivery_charges = cart::flat_delivery_fee();

        let payload = to_cart_payload(&state);
        assert_eq!(payload.products.len(), 1);
        assert_eq!(payload.delivery_charges, cart::flat_delivery_fee());

        let json = serde_json::to_value(&payload).unwrap();
        let line = &json["products"][0];
        assert!(line.get("productId").is_some());
        assert!(line.get("cartItemId").is_none());
    }
}
