//! Tokri Engine - cart aggregation and checkout preparation.
//!
//! This crate owns the shopping cart of a storefront client: resolving
//! effective unit prices (variants, volume tiers, deal-of-the-day),
//! aggregating line items into totals, persisting the cart to local
//! storage, reconciling it with the backend cart at checkout entry and
//! login, and assembling the order submission payload.
//!
//! # Architecture
//!
//! - [`Storefront`] is the injected state container: a cheaply cloneable
//!   handle over configuration, the backend REST client, the cart store,
//!   and the session marker. No ambient globals.
//! - All cart mutations are synchronous and recompute the derived totals
//!   before returning; observers subscribe to snapshots via a watch
//!   channel.
//! - The backend owns business logic; this engine only owns the cart
//!   invariants and the shapes it exchanges with the backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokri_engine::{Config, Selection, Storefront};
//!
//! let engine = Storefront::new(Config::from_env()?)?;
//! engine.add_to_cart(&"p1".into(), &Selection::default(), 2).await?;
//! let cart = engine.enter_checkout().await?;
//! let order_id = engine.place_order(&cart, &address).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod engine;
pub mod error;
pub mod pricing;
pub mod session;

pub use api::BackendClient;
pub use cart::{CartState, CartStore, LineItem};
pub use checkout::ShippingAddress;
pub use config::Config;
pub use engine::Storefront;
pub use error::EngineError;
pub use pricing::Selection;
pub use session::SessionMode;
