//! Storefront backend REST client.
//!
//! # Architecture
//!
//! - Plain REST/JSON over `reqwest` with an explicit per-request timeout
//! - The backend is source of truth for catalog data - no local sync
//! - In-memory caching via `moka` for product fetches (5 minute TTL);
//!   cart and order endpoints are never cached (mutable state)
//!
//! # Endpoints
//!
//! - `GET  /products/{id}` - catalog record for the pricing resolver
//! - `POST /cart/add` - push a cart snapshot (`{userId, cart}`)
//! - `GET  /cart/{userId}` - fetch the server-held cart
//! - `DELETE /cart/{userId}` - clear the server-held cart
//! - `POST /cart/merge` - fold a guest cart into a user's cart
//! - `POST /orders` - place an order

pub mod conversions;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use tokri_core::{ProductId, UserId};

use crate::config::ApiConfig;
use types::{CartPayload, ErrorBody, MergeCartRequest, OrderPayload, OrderResponse,
    ProductRecord, PushCartRequest, ServerCart};

/// Product cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the call.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// The message to surface to a shopper.
    ///
    /// Server-supplied messages pass through; transport and parse
    /// failures collapse to a generic retryable message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            Self::NotFound(what) => format!("{what} was not found"),
            Self::Http(_) | Self::Parse(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the storefront backend API.
///
/// Provides typed access to the catalog, cart, and order endpoints.
/// Products are cached for 5 minutes.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    product_cache: Cache<String, ProductRecord>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        let base_url = config.base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url,
                api_token: config.token_value(),
                product_cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, ApiError> {
        let response = self
            .apply_auth(self.inner.client.get(self.endpoint(path)))
            .send()
            .await?;
        Self::decode(response, what).await
    }

    /// Issue a POST with a JSON body and decode the JSON response.
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .apply_auth(self.inner.client.post(self.endpoint(path)))
            .json(body)
            .send()
            .await?;
        Self::decode(response, what).await
    }

    /// Issue a POST with a JSON body, discarding any response body.
    async fn post_ack<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .apply_auth(self.inner.client.post(self.endpoint(path)))
            .json(body)
            .send()
            .await?;
        Self::check_status(response, what).await.map(|_| ())
    }

    /// Check the response status, returning the body text on success.
    ///
    /// Non-success statuses become [`ApiError::NotFound`] (404) or
    /// [`ApiError::Server`] carrying the backend's `message` when the
    /// error body has one.
    async fn check_status(response: reqwest::Response, what: &str) -> Result<String, ApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(what.to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| body.chars().take(200).collect());
            tracing::error!(
                status = %status,
                message = %message,
                "Backend returned non-success status"
            );
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Check the status and parse the body into `T`.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, ApiError> {
        let body = Self::check_status(response, what).await?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<ProductRecord, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(product) = self.inner.product_cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: ProductRecord = self
            .get_json(&format!("products/{product_id}"), "Product")
            .await?;

        self.inner
            .product_cache
            .insert(cache_key, product.clone())
            .await;

        Ok(product)
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, product_id: &ProductId) {
        let cache_key = format!("product:{product_id}");
        self.inner.product_cache.invalidate(&cache_key).await;
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Push a cart snapshot so the backend can persist an order draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, cart), fields(user_id = %user_id))]
    pub async fn push_cart(&self, user_id: &UserId, cart: &CartPayload) -> Result<(), ApiError> {
        let request = PushCartRequest {
            user_id: user_id.clone(),
            cart: cart.clone(),
        };
        self.post_ack("cart/add", &request, "Cart").await
    }

    /// Fetch the server-held cart for a user.
    ///
    /// Returns `Ok(None)` when the user has no server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch_cart(&self, user_id: &UserId) -> Result<Option<ServerCart>, ApiError> {
        match self
            .get_json::<Option<ServerCart>>(&format!("cart/{user_id}"), "Cart")
            .await
        {
            Ok(cart) => Ok(cart),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete the server-held cart for a user.
    ///
    /// A cart that is already gone counts as cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &UserId) -> Result<(), ApiError> {
        let response = self
            .apply_auth(self.inner.client.delete(self.endpoint(&format!("cart/{user_id}"))))
            .send()
            .await?;

        match Self::check_status(response, "Cart").await {
            Ok(_) | Err(ApiError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Fold a guest's server-side cart into the identified user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers treat this call as
    /// best-effort.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn merge_cart(&self, user_id: &UserId) -> Result<(), ApiError> {
        let request = MergeCartRequest {
            user_id: user_id.clone(),
        };
        self.post_ack("cart/merge", &request, "Cart").await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend's message when placement is
    /// rejected, or a transport error when the call fails.
    #[instrument(skip(self, payload))]
    pub async fn place_order(&self, payload: &OrderPayload) -> Result<OrderResponse, ApiError> {
        self.post_json("orders", payload, "Order").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("Product".to_string());
        assert_eq!(err.to_string(), "Not found: Product");

        let err = ApiError::Server {
            status: 400,
            message: "Out of stock".to_string(),
        };
        assert_eq!(err.to_string(), "Server error (400): Out of stock");
    }

    #[test]
    fn test_user_message_passes_server_message_through() {
        let err = ApiError::Server {
            status: 400,
            message: "Coupon expired".to_string(),
        };
        assert_eq!(err.user_message(), "Coupon expired");
    }

    #[test]
    fn test_user_message_generic_for_parse_errors() {
        let parse_err = serde_json::from_str::<ErrorBody>("{not json").unwrap_err();
        let err = ApiError::Parse(parse_err);
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }
}
