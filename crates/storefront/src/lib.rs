//! NissaHub Storefront library.
//!
//! The cart state manager and everything that renders or serves it:
//!
//! - [`store`] - Persisted slot and the cart repository
//! - [`cart`] - Cart state manager and change observers
//! - [`views`] - View models for badge, add button, cart, and checkout pages
//! - [`routes`] - Axum handlers and Askama templates
//! - [`services`] - Marketplace API client
//!
//! Exposed as a library so the CLI and the integration tests drive the same
//! code as the server binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod views;
