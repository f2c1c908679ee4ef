//! End-to-end cart and checkout flows against a mock backend.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use tokri_core::{CartItemId, Price, ProductId, UserId};
use tokri_engine::checkout::{CheckoutError, ShippingAddress};
use tokri_engine::config::{ApiConfig, Config};
use tokri_engine::error::EngineError;
use tokri_engine::pricing::{PricingError, Selection};
use tokri_engine::Storefront;

fn engine_for(server: &mockito::ServerGuard, data_dir: PathBuf) -> Storefront {
    let config = Config {
        api: ApiConfig {
            base_url: Url::parse(&server.url()).unwrap(),
            api_token: None,
            http_timeout: Duration::from_secs(5),
        },
        data_dir,
    };
    Storefront::new(config).unwrap()
}

fn address() -> ShippingAddress {
    ShippingAddress {
        first_name: "Ayesha".to_string(),
        last_name: "Khan".to_string(),
        province: "Sindh".to_string(),
        city: "Karachi".to_string(),
        street_address: "12 Zamzama Lane".to_string(),
        mobile: "03001234567".to_string(),
        email: "ayesha@example.com".to_string(),
    }
}

async fn mock_product(
    server: &mut mockito::ServerGuard,
    id: &str,
    body: &str,
) -> mockito::Mock {
    server
        .mock("GET", format!("/products/{id}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn guest_checkout_clears_cart_and_storage_on_success() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _product_mock = mock_product(
        &mut server,
        "p1",
        r#"{"_id": "p1", "title": "Copper Lamp", "price": 100, "stock": 10}"#,
    )
    .await;
    let _product_mock = mock_product(
        &mut server,
        "p2",
        r#"{"_id": "p2", "title": "Tea Tray", "price": 50, "freeShipping": true}"#,
    )
    .await;
    let _mock = server
        .mock("POST", "/cart/add")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _mock = server
        .mock("POST", "/orders")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"order": {"_id": "ord-1"}, "message": "Order placed"}"#)
        .create_async()
        .await;

    let engine = engine_for(&server, dir.path().to_path_buf());

    engine
        .add_to_cart(&ProductId::new("p1"), &Selection::default(), 2)
        .await
        .unwrap();
    engine
        .add_to_cart(&ProductId::new("p2"), &Selection::default(), 1)
        .await
        .unwrap();

    let state = engine.cart().snapshot();
    assert_eq!(state.cart_total, Price::rupees(250));
    assert!(!state.free_shipping);
    assert_eq!(state.delivery_charges, Price::rupees(200));
    assert!(engine.config().cart_file().exists());

    let checkout_cart = engine.enter_checkout().await.unwrap();
    assert_eq!(checkout_cart.subtotal, Price::rupees(250));
    assert_eq!(checkout_cart.total_price(), Price::rupees(450));

    let order_id = engine.place_order(&checkout_cart, &address()).await.unwrap();
    assert_eq!(order_id.as_str(), "ord-1");

    let state = engine.cart().snapshot();
    assert!(state.is_empty());
    assert_eq!(state.cart_total, Price::zero());
    assert!(!engine.config().cart_file().exists());
}

#[tokio::test]
async fn removing_the_paid_item_restores_free_shipping() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _product_mock = mock_product(
        &mut server,
        "p1",
        r#"{"_id": "p1", "title": "Copper Lamp", "price": 100}"#,
    )
    .await;
    let _product_mock = mock_product(
        &mut server,
        "p2",
        r#"{"_id": "p2", "title": "Tea Tray", "price": 50, "freeShipping": true}"#,
    )
    .await;

    let engine = engine_for(&server, dir.path().to_path_buf());
    engine
        .add_to_cart(&ProductId::new("p1"), &Selection::default(), 2)
        .await
        .unwrap();
    engine
        .add_to_cart(&ProductId::new("p2"), &Selection::default(), 1)
        .await
        .unwrap();

    engine.cart().remove_item(&CartItemId::new("p1"));

    let state = engine.cart().snapshot();
    assert_eq!(state.cart_total, Price::rupees(50));
    assert!(state.free_shipping);
    assert_eq!(state.delivery_charges, Price::zero());
}

#[tokio::test]
async fn add_to_cart_blocks_unconfigured_variants() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _product_mock = mock_product(
        &mut server,
        "p1",
        r#"{
            "_id": "p1", "title": "Copper Lamp", "price": 1000,
            "variants": [{"name": "Finish", "values": [{"value": "Brushed", "price": 1200}]}]
        }"#,
    )
    .await;

    let engine = engine_for(&server, dir.path().to_path_buf());

    let err = engine
        .add_to_cart(&ProductId::new("p1"), &Selection::default(), 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Pricing(PricingError::VariantRequired)
    ));
    assert!(engine.cart().snapshot().is_empty());

    let selection = Selection::default().with_variant("Finish", "Brushed");
    let item = engine
        .add_to_cart(&ProductId::new("p1"), &selection, 1)
        .await
        .unwrap();
    assert_eq!(item.price, Price::rupees(1200));
    assert_eq!(item.cart_item_id, CartItemId::new("p1|Finish:Brushed"));
}

#[tokio::test]
async fn validation_failure_never_reaches_the_network() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let orders_mock = server
        .mock("POST", "/orders")
        .expect(0)
        .create_async()
        .await;

    let engine = engine_for(&server, dir.path().to_path_buf());

    let cart = tokri_engine::api::conversions::CheckoutCart {
        items: Vec::new(),
        subtotal: Price::zero(),
        free_shipping: false,
        delivery_charges: Price::zero(),
    };

    let err = engine
        .place_order(&cart, &ShippingAddress::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Checkout(CheckoutError::FirstNameRequired)
    ));

    let mut bad_mobile = address();
    bad_mobile.mobile = "123".to_string();
    let err = engine.place_order(&cart, &bad_mobile).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Checkout(CheckoutError::InvalidMobile)
    ));

    orders_mock.assert_async().await;
}

#[tokio::test]
async fn order_failure_preserves_the_cart() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _product_mock = mock_product(
        &mut server,
        "p1",
        r#"{"_id": "p1", "title": "Copper Lamp", "price": 100}"#,
    )
    .await;
    let _mock = server
        .mock("POST", "/cart/add")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _mock = server
        .mock("POST", "/orders")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Order service unavailable"}"#)
        .create_async()
        .await;

    let engine = engine_for(&server, dir.path().to_path_buf());
    engine
        .add_to_cart(&ProductId::new("p1"), &Selection::default(), 2)
        .await
        .unwrap();

    let checkout_cart = engine.enter_checkout().await.unwrap();
    let err = engine
        .place_order(&checkout_cart, &address())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Order service unavailable");

    let state = engine.cart().snapshot();
    assert_eq!(state.cart_total, Price::rupees(200));
    assert!(engine.config().cart_file().exists());
}

#[tokio::test]
async fn login_merges_guest_cart_once_and_server_cart_wins_at_checkout() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let merge_mock = server
        .mock("POST", "/cart/merge")
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let _product_mock = mock_product(
        &mut server,
        "p1",
        r#"{"_id": "p1", "title": "Copper Lamp", "price": 100}"#,
    )
    .await;
    let _mock = server
        .mock("POST", "/cart/add")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _mock = server
        .mock("GET", "/cart/u-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "products": [
                    {
                        "product": {"_id": "p1", "title": "Lamp (updated)", "price": 90},
                        "count": 3
                    }
                ],
                "deliveryCharges": 200
            }"#,
        )
        .create_async()
        .await;

    let engine = engine_for(&server, dir.path().to_path_buf());
    engine
        .add_to_cart(&ProductId::new("p1"), &Selection::default(), 1)
        .await
        .unwrap();

    engine.login(UserId::new("u-1")).await;
    assert!(!engine.session().is_guest());

    // Logging in again must not fire another merge
    engine.login(UserId::new("u-1")).await;
    merge_mock.assert_async().await;

    let checkout_cart = engine.enter_checkout().await.unwrap();
    assert_eq!(checkout_cart.items.len(), 1);
    assert_eq!(checkout_cart.items[0].title, "Lamp (updated)");
    assert_eq!(checkout_cart.items[0].price, Price::rupees(90));
    assert_eq!(checkout_cart.subtotal, Price::rupees(270));
}

#[tokio::test]
async fn merge_failure_never_blocks_login() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _mock = server
        .mock("POST", "/cart/merge")
        .with_status(500)
        .with_body(r#"{"message": "merge failed"}"#)
        .create_async()
        .await;

    let engine = engine_for(&server, dir.path().to_path_buf());
    engine.login(UserId::new("u-1")).await;

    assert_eq!(engine.session().user_id(), Some(&UserId::new("u-1")));
}

#[tokio::test]
async fn authenticated_order_clears_server_cart() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _mock = server
        .mock("POST", "/cart/merge")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _product_mock = mock_product(
        &mut server,
        "p1",
        r#"{"_id": "p1", "title": "Copper Lamp", "price": 100}"#,
    )
    .await;
    let _mock = server
        .mock("POST", "/cart/add")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _mock = server
        .mock("GET", "/cart/u-1")
        .with_status(404)
        .create_async()
        .await;
    let _mock = server
        .mock("POST", "/orders")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"order": {"_id": "ord-2"}, "message": "Order placed"}"#)
        .create_async()
        .await;
    let clear_mock = server
        .mock("DELETE", "/cart/u-1")
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let engine = engine_for(&server, dir.path().to_path_buf());
    engine.login(UserId::new("u-1")).await;
    engine
        .add_to_cart(&ProductId::new("p1"), &Selection::default(), 1)
        .await
        .unwrap();

    // No server-held cart yet, so checkout falls back to the local snapshot
    let checkout_cart = engine.enter_checkout().await.unwrap();
    assert_eq!(checkout_cart.subtotal, Price::rupees(100));

    let order_id = engine.place_order(&checkout_cart, &address()).await.unwrap();
    assert_eq!(order_id.as_str(), "ord-2");
    assert!(engine.cart().snapshot().is_empty());
    clear_mock.assert_async().await;
}
