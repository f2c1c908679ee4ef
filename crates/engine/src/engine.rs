//! The injected state container and its high-level flows.
//!
//! [`Storefront`] is what an embedding UI holds: a cheaply cloneable
//! handle over the configuration, backend client, cart store, and
//! session marker. UI fragments observe one consistent cart through it;
//! there is no ambient global store.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tracing::{instrument, warn};

use tokri_core::{OrderId, ProductId, UserId};

use crate::api::conversions::{self, CartSource, CheckoutCart};
use crate::api::types::ProductRecord;
use crate::api::BackendClient;
use crate::cart::storage::{CartStorage, JsonFileStorage};
use crate::cart::{self, CartStore, LineItem};
use crate::checkout::{self, ShippingAddress};
use crate::config::Config;
use crate::error::EngineError;
use crate::pricing::{self, Selection};
use crate::session::SessionMode;

/// The engine's state container.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: Config,
    api: BackendClient,
    cart: CartStore,
    session: RwLock<SessionMode>,
}

impl Storefront {
    /// Create an engine persisting the cart under the configured data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        let storage = JsonFileStorage::new(config.cart_file());
        Self::with_storage(config, Box::new(storage))
    }

    /// Create an engine with an injected storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(
        config: Config,
        storage: Box<dyn CartStorage>,
    ) -> Result<Self, EngineError> {
        let api = BackendClient::new(&config.api)?;
        let cart = CartStore::new(storage);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                cart,
                session: RwLock::new(SessionMode::new_guest()),
            }),
        })
    }

    /// Get a reference to the engine configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &BackendClient {
        &self.inner.api
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// The current session marker.
    #[must_use]
    pub fn session(&self) -> SessionMode {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_session(&self, session: SessionMode) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Restore a previously established session marker.
    ///
    /// Unlike [`Storefront::login`] this fires no merge call; use it when
    /// rehydrating a session the user already logged into.
    pub fn restore_session(&self, session: SessionMode) {
        self.set_session(session);
    }

    // =========================================================================
    // Shopping Flows
    // =========================================================================

    /// Fetch a product for display; the pricing resolver works from this
    /// record.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    pub async fn product(&self, product_id: &ProductId) -> Result<ProductRecord, EngineError> {
        Ok(self.inner.api.get_product(product_id).await?)
    }

    /// Resolve a configuration and add it to the cart.
    ///
    /// Runs the selection gates first (variants chosen, tier chosen,
    /// stock snapshot), then snapshots the resolved price and image into
    /// a line item. A zero count is treated as one.
    ///
    /// # Errors
    ///
    /// Returns a pricing error when the gates fail, or an API error when
    /// the product cannot be fetched.
    #[instrument(skip(self, selection), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        selection: &Selection,
        count: u32,
    ) -> Result<LineItem, EngineError> {
        let product = self.inner.api.get_product(product_id).await?;

        pricing::validate_selection(&product, selection)?;
        let count = count.max(1);
        pricing::check_stock(&product, count)?;

        let quote = pricing::resolve(&product, selection, Utc::now());

        let item = LineItem {
            cart_item_id: cart::derive_cart_item_id(&product.id, &selection.variants),
            product_id: product.id.clone(),
            title: product.title.clone(),
            image: quote.image,
            price: quote.unit_price,
            count,
            selected_variants: selection.variants.clone(),
            free_shipping: product.free_shipping,
            delivery_charges: cart::item_delivery_charge(product.free_shipping),
            selected_tier: quote.tier,
        };

        self.inner.cart.add_item(item.clone());
        Ok(item)
    }

    /// Reconcile the cart with the backend and return the normalized
    /// checkout view.
    ///
    /// The current snapshot is pushed so the backend holds an order
    /// draft. Guests then check out against the local snapshot; for
    /// authenticated sessions the server-held cart is fetched and
    /// supersedes it. A failed push or fetch aborts checkout entry; the
    /// local cart mutations already applied are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns an API error when the push or fetch fails.
    #[instrument(skip(self))]
    pub async fn enter_checkout(&self) -> Result<CheckoutCart, EngineError> {
        let snapshot = self.inner.cart.snapshot();
        let session = self.session();

        if !snapshot.is_empty() {
            let payload = conversions::to_cart_payload(&snapshot);
            self.inner
                .api
                .push_cart(&session.cart_owner(), &payload)
                .await?;
        }

        match session {
            SessionMode::Guest { .. } => {
                Ok(conversions::normalize(CartSource::Local(snapshot)))
            }
            SessionMode::Authenticated { user_id } => {
                match self.inner.api.fetch_cart(&user_id).await? {
                    Some(server_cart) => {
                        Ok(conversions::normalize(CartSource::Server(server_cart)))
                    }
                    None => Ok(conversions::normalize(CartSource::Local(snapshot))),
                }
            }
        }
    }

    /// Switch the session to an authenticated user.
    ///
    /// When the session was a guest, a merge request folds the guest's
    /// server-side cart into the user's cart. The merge fires once and is
    /// best-effort: failure is logged and never blocks login.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn login(&self, user_id: UserId) {
        if self.session().is_guest()
            && let Err(e) = self.inner.api.merge_cart(&user_id).await
        {
            warn!(error = %e, "Guest cart merge failed; continuing login");
        }

        self.set_session(SessionMode::Authenticated { user_id });
    }

    /// Drop back to a fresh guest session.
    pub fn logout(&self) {
        self.set_session(SessionMode::new_guest());
    }

    /// Validate the address, submit the order, and clear the cart.
    ///
    /// Validation happens before anything reaches the network. On
    /// success the local cart always clears; for authenticated sessions
    /// the server-side cart is cleared too, best-effort. On failure the
    /// cart is left untouched for retry.
    ///
    /// # Errors
    ///
    /// Returns a checkout error when validation fails, or an API error
    /// carrying the backend's message when placement is rejected.
    #[instrument(skip(self, cart, address))]
    pub async fn place_order(
        &self,
        cart: &CheckoutCart,
        address: &ShippingAddress,
    ) -> Result<OrderId, EngineError> {
        let session = self.session();
        let payload = checkout::build_order_payload(cart, address, session.user_id())?;

        let response = self.inner.api.place_order(&payload).await?;

        self.inner.cart.clear();
        if let SessionMode::Authenticated { user_id } = &session
            && let Err(e) = self.inner.api.clear_cart(user_id).await
        {
            warn!(error = %e, "Failed to clear server-side cart after order placement");
        }

        Ok(response.order.id)
    }
}
