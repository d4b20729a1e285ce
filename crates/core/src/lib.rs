//! NissaHub Core - Shared domain types.
//!
//! This crate provides the types used across all NissaHub components:
//! - `storefront` - Cart/checkout pages and the cart state manager
//! - `cli` - Command-line access to the cart and the marketplace API
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, cart line items, and API payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
