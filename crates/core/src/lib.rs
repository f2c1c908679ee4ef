//! Tokri Core - Shared types library.
//!
//! This crate provides common types used across all Tokri components:
//! - `engine` - Cart aggregation and checkout-preparation engine
//! - `cli` - Command-line driver for the engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and rupee prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
